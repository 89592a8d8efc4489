use lead_intake::config::DatabaseConfig;
use lead_intake::error::AppError;
use lead_intake::leads::{LeadImportService, SqliteLeadStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured store and wires the import pipeline on top of it.
pub(crate) async fn import_service(
    database: &DatabaseConfig,
) -> Result<Arc<LeadImportService<SqliteLeadStore>>, AppError> {
    let store = SqliteLeadStore::connect(&database.url).await?;
    Ok(Arc::new(LeadImportService::new(Arc::new(store))))
}
