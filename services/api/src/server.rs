use crate::cli::ServeArgs;
use crate::infra::{image_source, AppState};
use crate::routes::dossier_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use member_dossier::config::AppConfig;
use member_dossier::dossier::FieldCatalog;
use member_dossier::error::AppError;
use member_dossier::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let catalog = Arc::new(FieldCatalog::standard());
    // The blocking HTTP client must be built outside the async runtime.
    let report_config = config.report.clone();
    let images = tokio::task::spawn_blocking(move || image_source(&report_config, false))
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
        images,
        placeholder: config.report.placeholder.clone(),
    };

    let app = dossier_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, fields = catalog.len(), "member dossier service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
