use serde_json::Value;

use super::path;

/// Display-only field combining a title and a name stored elsewhere on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualFieldRule {
    pub path: &'static str,
    pub title_path: &'static str,
    pub name_path: &'static str,
}

impl VirtualFieldRule {
    /// Joined `"{title} {name}"`, trimmed. May be empty.
    pub fn combine(&self, record: &Value) -> String {
        let title = text_at(record, self.title_path);
        let name = text_at(record, self.name_path);
        format!("{} {}", title.trim(), name.trim()).trim().to_string()
    }
}

pub static VIRTUAL_FIELD_RULES: [VirtualFieldRule; 3] = [
    VirtualFieldRule {
        path: "personalDetails.titleCombinedName",
        title_path: "personalDetails.title",
        name_path: "personalDetails.nameOfMember",
    },
    VirtualFieldRule {
        path: "personalDetails.fatherCombinedName",
        title_path: "personalDetails.fatherTitle",
        name_path: "personalDetails.nameOfFather",
    },
    VirtualFieldRule {
        path: "personalDetails.motherCombinedName",
        title_path: "personalDetails.motherTitle",
        name_path: "personalDetails.nameOfMother",
    },
];

pub fn rule_for(path: &str) -> Option<&'static VirtualFieldRule> {
    VIRTUAL_FIELD_RULES.iter().find(|rule| rule.path == path)
}

pub fn is_virtual(path: &str) -> bool {
    rule_for(path).is_some()
}

/// Resolves a virtual path, substituting `fallback` when both parts are blank.
/// Returns `None` for paths that are not virtual.
pub fn resolve(path: &str, record: &Value, fallback: &str) -> Option<String> {
    rule_for(path).map(|rule| {
        let combined = rule.combine(record);
        if combined.is_empty() {
            fallback.to_string()
        } else {
            combined
        }
    })
}

/// Raw lookup that honours virtual paths before falling back to the stored value.
/// Virtual fields resolve to a string which is empty when nothing was entered.
pub fn lookup(record: &Value, path: &str) -> Option<Value> {
    match rule_for(path) {
        Some(rule) => Some(Value::String(rule.combine(record))),
        None => path::get(record, path).cloned(),
    }
}

fn text_at<'a>(record: &'a Value, path: &str) -> &'a str {
    path::get(record, path)
        .and_then(Value::as_str)
        .unwrap_or_default()
}
