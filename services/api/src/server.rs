use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{demo_bureau, AppState, InMemoryEvaluationRepository};
use crate::routes::with_decision_routes;
use credit_engine::config::AppConfig;
use credit_engine::decision::{DecisionService, EngineConfig};
use credit_engine::error::AppError;
use credit_engine::telemetry;

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

    let bureau = Arc::new(demo_bureau());
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let decision_service = Arc::new(DecisionService::new(
        bureau,
        repository,
        EngineConfig::standard(),
    )?);

    let app = with_decision_routes(decision_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit decision engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
