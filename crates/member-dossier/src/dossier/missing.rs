use serde_json::Value;

/// Classifies a looked-up value as missing. Booleans and numbers always count
/// as filled, so a `false` answer is never reported as absent.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(value) => is_missing_value(value),
    }
}

pub fn is_missing_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty() || map.values().all(is_blank_member),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// One level only: nested objects count as blank when they have no keys.
fn is_blank_member(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
