use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Map, Value};

use super::missing::is_missing_value;

/// Renders a record value as report cell text.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => yes_no(*flag).to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format_text(text),
        Value::Array(items) => format_array(items),
        Value::Object(map) => format_object(map),
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Member dates are entered in India; pickers store local midnight as UTC.
const MEMBER_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// `DD/MM/YYYY` for RFC 3339 timestamps and `YYYY-MM-DD` dates.
///
/// Timestamps are read on the member's calendar (UTC+05:30), so
/// `2024-11-02T18:30:00Z` is the 3rd of November.
pub fn format_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        let local = FixedOffset::east_opt(MEMBER_UTC_OFFSET_SECS)
            .map(|offset| timestamp.with_timezone(&offset))
            .unwrap_or(timestamp);
        return Some(local.date_naive().format("%d/%m/%Y").to_string());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%d/%m/%Y").to_string())
}

/// Address components joined with commas, skipping blanks.
pub fn format_address(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .filter(|(_, component)| !is_missing_value(component))
            .map(|(_, component)| format_value(component))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(entries) => entries
            .iter()
            .map(format_address)
            .filter(|address| !address.is_empty())
            .collect::<Vec<_>>()
            .join(" | "),
        other => format_value(other),
    }
}

fn format_text(text: &str) -> String {
    format_date(text).unwrap_or_else(|| text.trim().to_string())
}

fn format_array(items: &[Value]) -> String {
    let separator = if items.iter().any(Value::is_object) {
        " | "
    } else {
        ", "
    };

    items
        .iter()
        .filter(|item| !is_missing_value(item))
        .map(format_value)
        .collect::<Vec<_>>()
        .join(separator)
}

fn format_object(map: &Map<String, Value>) -> String {
    map.iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, nested)| format!("{key}: {}", format_value(nested)))
        .collect::<Vec<_>>()
        .join("; ")
}
