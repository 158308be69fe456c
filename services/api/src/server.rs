use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use crate::seed::{seed_demo_data, SeedOutcome};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruitment::config::AppConfig;
use recruitment::error::AppError;
use recruitment::{telemetry, ApiState, MemoryStore};
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

    let store = Arc::new(MemoryStore::default());
    let api_state = ApiState::new(store.clone(), &config.auth, config.lifecycle);

    if args.seed {
        if let SeedOutcome::Seeded { jobs } =
            seed_demo_data(store.as_ref(), &api_state, args.seed_jobs)?
        {
            info!(jobs, "demo data loaded");
        }
    }

    let app = with_service_routes(api_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        finalize_mode = ?config.lifecycle.finalize_mode,
        %addr,
        "recruitment api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
