use crate::infra::{parse_format, parse_selection, AppState};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::Local;
use member_dossier::dossier::{FieldProjector, FieldView, OccupationType, ViewType};
use member_dossier::error::AppError;
use member_dossier::report::{member_name, ReportExporter, ReportOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

#[derive(Debug, Deserialize)]
pub(crate) struct FieldsRequest {
    pub(crate) member: Value,
    #[serde(default = "default_selector")]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) view: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FieldsResponse {
    pub(crate) member_name: String,
    pub(crate) category: &'static str,
    pub(crate) category_label: &'static str,
    pub(crate) view: ViewType,
    pub(crate) view_label: &'static str,
    pub(crate) occupation: OccupationType,
    pub(crate) total: usize,
    pub(crate) missing: usize,
    pub(crate) fields: Vec<FieldView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) member: Value,
    #[serde(default = "default_selector")]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) view: Option<String>,
    #[serde(default = "default_format")]
    pub(crate) format: String,
}

fn default_selector() -> String {
    "all".to_string()
}

fn default_format() -> String {
    "pdf".to_string()
}

pub(crate) fn dossier_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/members/fields",
            axum::routing::post(member_fields_endpoint),
        )
        .route(
            "/api/v1/members/report",
            axum::routing::post(member_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn member_fields_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<FieldsRequest>,
) -> Result<Json<FieldsResponse>, AppError> {
    let (selector, view) = parse_selection(&payload.category, payload.view.as_deref())?;
    let record = payload.member;

    let projector = FieldProjector::new(&state.catalog);
    let fields = projector.field_views(&record, selector, view, &state.placeholder);
    let missing = fields.iter().filter(|field| field.is_missing).count();

    Ok(Json(FieldsResponse {
        member_name: member_name(&record, "Unknown"),
        category: selector.key(),
        category_label: selector.label(),
        view,
        view_label: view.label(),
        occupation: OccupationType::detect(&record),
        total: fields.len(),
        missing,
        fields,
    }))
}

pub(crate) async fn member_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let (selector, view) = parse_selection(&payload.category, payload.view.as_deref())?;
    let format = parse_format(&payload.format)?;
    let record = payload.member;

    let catalog = state.catalog.clone();
    let images = state.images.clone();
    let options = ReportOptions {
        placeholder: state.placeholder.clone(),
        ..ReportOptions::default()
    };

    // Photo downloads block; keep them off the async workers.
    let artifact = tokio::task::spawn_blocking(move || {
        ReportExporter::new(&catalog, images.as_ref(), options).export(
            &record,
            selector,
            view,
            format,
            Local::now().naive_local(),
        )
    })
    .await
    .map_err(|err| {
        error!(error = %err, "report task aborted");
        AppError::Io(std::io::Error::other(err))
    })??;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        artifact.filename
    ))
    .map_err(|err| AppError::Request(err.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(artifact.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
