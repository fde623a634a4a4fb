use crate::cli::ServeArgs;
use crate::infra::{build_pool, seed_store, AppState};
use crate::routes::with_suite_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_isolation::config::AppConfig;
use tenant_isolation::error::AppError;
use tenant_isolation::suite::demo_organizations;
use tenant_isolation::telemetry;
use tracing::{info, warn};

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
    let pool = build_pool(config.storage.pool_size);

    if config.storage.seed_on_start {
        let organizations = demo_organizations(Local::now().date_naive());
        for report in seed_store(&pool, &organizations)? {
            info!(
                organization = %report.organization,
                tenant = %report.tenant,
                "demo organization available"
            );
        }
    }
    if config.auth.api_keys.is_empty() {
        warn!("APP_API_KEYS is empty; every tenant-scoped request will be rejected");
    }

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pool: pool.clone(),
    };

    let app = with_suite_routes(pool, Arc::new(config.auth.api_keys.clone()))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        pool_size = config.storage.pool_size,
        "tenant isolation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
