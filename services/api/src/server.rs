use crate::cli::ServeArgs;
use crate::demo::{seed_catalog, DEMO_DATA_YEAR, DEMO_SESSION_TOKEN};
use crate::infra::{AppState, InMemoryAdmissionsStore, InMemoryUserStore};
use crate::routes::with_admission_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cet_mentor::config::AppConfig;
use cet_mentor::error::AppError;
use cet_mentor::telemetry;
use cet_mentor::workflows::admission::{AdmissionService, PredictionConfig, UserId};
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

    let catalog = Arc::new(InMemoryAdmissionsStore::default());
    seed_catalog(&catalog);
    let users = Arc::new(InMemoryUserStore::new(catalog.clone()));
    users.register_session(DEMO_SESSION_TOKEN, UserId("user-demo".to_string()));

    // The bundled catalog carries a fixed cutoff year; an APP_DATA_YEAR
    // override still wins.
    let prediction_config = PredictionConfig {
        data_year: config.data_year.or(Some(DEMO_DATA_YEAR)),
        ..PredictionConfig::default()
    };
    let admission_service = Arc::new(AdmissionService::new(catalog, users, prediction_config));

    let app = with_admission_routes(admission_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admission mentor api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
