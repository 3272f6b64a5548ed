use serde::Serialize;
use serde_json::Value;

use super::catalog::{Category, FieldCatalogEntry};
use super::path;

/// Professional paths shown regardless of the detected occupation.
pub const ALWAYS_SHOWN_PROFESSIONAL_PATHS: [&str; 4] = [
    "professionalDetails.qualification",
    "professionalDetails.occupation",
    "professionalDetails.degreeNumber",
    "professionalDetails.serviceType",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OccupationType {
    Government,
    Private,
    Business,
    Unknown,
}

impl OccupationType {
    /// Detects the member's occupation. Government wins over private, and
    /// private over business; each type matches on the `occupation` text, its
    /// boolean flag, or the `serviceType` text.
    pub fn detect(record: &Value) -> Self {
        let occupation = lowercase_text(record, "professionalDetails.occupation");
        let service_type = lowercase_text(record, "professionalDetails.serviceType");

        let signals = [
            (Self::Government, "government", "professionalDetails.inCaseOfServiceGovt"),
            (Self::Private, "private", "professionalDetails.inCaseOfPrivate"),
            (Self::Business, "business", "professionalDetails.inCaseOfBusiness"),
        ];

        signals
            .into_iter()
            .find(|(_, keyword, flag)| {
                occupation.contains(keyword)
                    || flag_set(record, flag)
                    || service_type.contains(keyword)
            })
            .map(|(kind, _, _)| kind)
            .unwrap_or(Self::Unknown)
    }

    /// Professional sub-object whose fields are shown for this occupation.
    /// Private members are routed to `serviceDetails`, not `privateServiceDetails`.
    pub const fn detail_group(self) -> Option<&'static str> {
        match self {
            Self::Government | Self::Private => Some("serviceDetails"),
            Self::Business => Some("businessDetails"),
            Self::Unknown => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Government => "Government Service",
            Self::Private => "Private Service",
            Self::Business => "Business",
            Self::Unknown => "Not Specified",
        }
    }
}

/// Drops professional sub-fields that do not match `occupation`.
pub fn filter_fields_by_occupation<'a>(
    entries: Vec<&'a FieldCatalogEntry>,
    occupation: OccupationType,
) -> Vec<&'a FieldCatalogEntry> {
    entries
        .into_iter()
        .filter(|entry| retains(entry, occupation))
        .collect()
}

fn retains(entry: &FieldCatalogEntry, occupation: OccupationType) -> bool {
    if entry.category != Category::Professional {
        return true;
    }
    if ALWAYS_SHOWN_PROFESSIONAL_PATHS.contains(&entry.path) {
        return true;
    }

    let group = entry.path.split('.').nth(1);
    match occupation.detail_group() {
        Some(expected) => group == Some(expected),
        None => false,
    }
}

fn lowercase_text(record: &Value, field: &str) -> String {
    path::get(record, field)
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn flag_set(record: &Value, field: &str) -> bool {
    match path::get(record, field) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
