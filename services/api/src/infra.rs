use member_dossier::config::ReportConfig;
use member_dossier::dossier::{CategorySelector, FieldCatalog, SelectorRequest, ViewType};
use member_dossier::error::AppError;
use member_dossier::report::{HttpImageSource, ImageSource, OfflineImageSource, ReportFormat};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<FieldCatalog>,
    pub(crate) images: Arc<dyn ImageSource>,
    pub(crate) placeholder: String,
}

/// HTTP photo fetcher, or the offline source when asked for or when the
/// client cannot be built.
pub(crate) fn image_source(config: &ReportConfig, offline: bool) -> Arc<dyn ImageSource> {
    if offline {
        return Arc::new(OfflineImageSource);
    }

    match HttpImageSource::new(config.image_timeout) {
        Ok(source) => Arc::new(source),
        Err(err) => {
            warn!(error = %err, "photo downloads disabled; reports will show placeholders");
            Arc::new(OfflineImageSource)
        }
    }
}

/// Resolves a selector string and optional view into a projection request.
/// `"filled"` and `"missing"` select every category and override `view`.
pub(crate) fn parse_selection(
    selector: &str,
    view: Option<&str>,
) -> Result<(CategorySelector, ViewType), AppError> {
    let request = SelectorRequest::parse(selector)
        .ok_or_else(|| AppError::Request(format!("unknown category '{selector}'")))?;

    let requested = match view {
        Some(raw) => ViewType::parse(raw)
            .ok_or_else(|| AppError::Request(format!("unknown view type '{raw}'")))?,
        None => ViewType::All,
    };

    Ok((request.selector, request.effective_view(requested)))
}

pub(crate) fn parse_format(raw: &str) -> Result<ReportFormat, AppError> {
    ReportFormat::parse(raw)
        .ok_or_else(|| AppError::Request(format!("unknown report format '{raw}'")))
}

/// Reads a member record as exported by the member API. A `{"data": {...}}`
/// envelope is unwrapped.
pub(crate) fn load_member(path: &Path) -> Result<Value, AppError> {
    let raw = std::fs::read(path)?;
    let value: Value = serde_json::from_slice(&raw).map_err(|err| {
        AppError::Request(format!("{} is not valid JSON: {err}", path.display()))
    })?;

    let Value::Object(mut map) = value else {
        return Err(AppError::Request(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    };

    if map.get("data").is_some_and(Value::is_object) {
        return Ok(map.remove("data").unwrap_or_default());
    }
    Ok(Value::Object(map))
}
