use crate::cli::ServeArgs;
use crate::infra::{AppState, HostelDesk};
use crate::routes::with_hostel_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hostel_ms::clock::SystemClock;
use hostel_ms::config::AppConfig;
use hostel_ms::error::AppError;
use hostel_ms::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let desk = HostelDesk::in_memory(config.sequences, Arc::new(SystemClock));
    let app = with_hostel_routes(&desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        student_sequence_start = config.sequences.student_code_start,
        "hostel management service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
