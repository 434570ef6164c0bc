use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRequestStore, SeededResidentDirectory};
use crate::routes::with_request_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brgy_docs::config::AppConfig;
use brgy_docs::error::AppError;
use brgy_docs::requests::{FeeSchedule, RequestLifecycleService};
use brgy_docs::telemetry;
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
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRequestStore::default());
    let directory = Arc::new(SeededResidentDirectory::sample_roster());
    let service = Arc::new(RequestLifecycleService::new(
        store,
        directory,
        FeeSchedule::standard(),
    ));

    let app = with_request_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "document request engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
