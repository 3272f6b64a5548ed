use chrono::NaiveDateTime;

use crate::dossier::projection::{CategorySelector, ViewType};

use super::ReportFormat;

/// `{Name}_{Category}_{ViewType}_{YYYYMMDD_HHMMSS}.{ext}` with the member name
/// reduced to ASCII alphanumerics joined by underscores.
pub fn export_filename(
    member_name: &str,
    selector: CategorySelector,
    view: ViewType,
    timestamp: NaiveDateTime,
    format: ReportFormat,
) -> String {
    let name = sanitize(member_name);
    let name = if name.is_empty() { "Unknown".to_string() } else { name };
    format!(
        "{name}_{}_{}_{}.{}",
        selector.key(),
        view.key(),
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn sanitize(raw: &str) -> String {
    raw.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
