use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, InMemoryDecisionPublisher};
use crate::routes::with_screening_routes;
use loan_ai::config::AppConfig;
use loan_ai::error::AppError;
use loan_ai::screening::{Classifier, ForestClassifier, ScreeningService};
use loan_ai::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // The artifact is loaded exactly once; the handle is immutable and
    // shared read-only across request handlers.
    let classifier: Arc<dyn Classifier> =
        Arc::new(ForestClassifier::from_path(&config.model.artifact_path)?);
    info!(
        path = %config.model.artifact_path.display(),
        "classifier artifact loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let alerts = Arc::new(InMemoryDecisionPublisher::default());
    let screening_service = Arc::new(ScreeningService::new(repository, alerts, classifier));

    let app = with_screening_routes(screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
