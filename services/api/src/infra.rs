use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tenant_isolation::error::AppError;
use tenant_isolation::isolation::{Connection, ConnectionPool, MemoryStore};
use tenant_isolation::suite::{seed_organization, OrganizationSeed, SeedReport};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pool: ConnectionPool<MemoryStore>,
}

pub(crate) fn build_pool(size: usize) -> ConnectionPool<MemoryStore> {
    ConnectionPool::new(Arc::new(MemoryStore::new()), size)
}

/// Seed each organization on a dedicated connection that never enters the pool.
pub(crate) fn seed_store(
    pool: &ConnectionPool<MemoryStore>,
    organizations: &[OrganizationSeed],
) -> Result<Vec<SeedReport>, AppError> {
    let seeder = Connection::new(pool.size(), Arc::clone(pool.store()));
    organizations
        .iter()
        .map(|seed| seed_organization(&seeder, seed).map_err(AppError::from))
        .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
