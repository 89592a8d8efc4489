use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::leads::domain::NormalizedLead;
use crate::leads::service::LeadImportService;
use crate::leads::store::{LeadStore, SqliteLeadStore, StoreError};

pub(super) const IMPORT_PATH: &str = "/api/v1/leads/import";
const BOUNDARY: &str = "lead-intake-test-boundary";

pub(super) const HEADER: &str = "fullName,email,phone,city,propertyType,bhk,purpose,budgetMin,budgetMax,timeline,source,status,notes,tags";

pub(super) fn valid_csv() -> String {
    format!(
        "{HEADER}\n\
John Doe,john@example.com,9876543210,Chandigarh,Apartment,TWO,Buy,5000000,7000000,ZERO_TO_3M,Website,,,\"vip, hot\"\n\
Jane Smith,,9876501234,Mohali,Villa,THREE,Buy,10000000,15000000,THREE_TO_6M,Referral,Qualified,Call after 6pm,\n\
Kiran Rao,,9876512345,Panchkula,Plot,,Buy,,,Exploring,Walk-in,,,\n"
    )
}

pub(super) fn mixed_csv() -> String {
    format!(
        "{HEADER}\n\
John Doe,john@example.com,9876543210,Chandigarh,Apartment,TWO,Buy,5000000,7000000,ZERO_TO_3M,Website,,,\n\
A,,9876501234,Mohali,Plot,,Buy,,,Exploring,Referral,,,\n\
Kiran Rao,,12345,Panchkula,Plot,,Buy,,,Exploring,Walk-in,,,\n\
Meera Iyer,,9876598765,Zirakpur,Apartment,,Rent,,,Exploring,Website,,,\n"
    )
}

/// Records every batch it is handed and always succeeds.
#[derive(Default, Clone)]
pub(super) struct RecordingStore {
    pub(super) batches: Arc<Mutex<Vec<Vec<NormalizedLead>>>>,
}

impl RecordingStore {
    pub(super) fn batches(&self) -> Vec<Vec<NormalizedLead>> {
        self.batches.lock().expect("store mutex poisoned").clone()
    }
}

impl LeadStore for RecordingStore {
    async fn create_many_with_audit(&self, leads: &[NormalizedLead]) -> Result<usize, StoreError> {
        self.batches
            .lock()
            .expect("store mutex poisoned")
            .push(leads.to_vec());
        Ok(leads.len())
    }
}

/// Simulates a store that cannot be reached.
pub(super) struct UnavailableStore;

impl LeadStore for UnavailableStore {
    async fn create_many_with_audit(&self, _leads: &[NormalizedLead]) -> Result<usize, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

pub(super) fn recording_service() -> (Arc<LeadImportService<RecordingStore>>, RecordingStore) {
    let store = RecordingStore::default();
    let service = Arc::new(LeadImportService::new(Arc::new(store.clone())));
    (service, store)
}

pub(super) async fn sqlite_service() -> (Arc<LeadImportService<SqliteLeadStore>>, SqliteLeadStore) {
    let store = SqliteLeadStore::connect("sqlite::memory:")
        .await
        .expect("in-memory store opens");
    let service = Arc::new(LeadImportService::new(Arc::new(store.clone())));
    (service, store)
}

pub(super) async fn table_count(store: &SqliteLeadStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .expect("count query")
}

pub(super) fn multipart_body(field: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"{field}\"; filename=\"leads.csv\"\r\n\
Content-Type: text/csv\r\n\r\n\
{contents}\r\n\
--{BOUNDARY}--\r\n"
    )
}

pub(super) fn upload_request(field: &str, contents: &str) -> Request<Body> {
    Request::post(IMPORT_PATH)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, contents)))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
