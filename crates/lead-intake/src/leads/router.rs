use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::domain::ImportOutcome;
use super::service::{ImportError, LeadImportService};
use super::store::LeadStore;

/// Multipart field carrying the CSV file.
pub const UPLOAD_FIELD: &str = "file";

/// Router builder exposing the bulk import endpoint.
pub fn lead_import_router<S>(service: Arc<LeadImportService<S>>) -> Router
where
    S: LeadStore + 'static,
{
    Router::new()
        .route("/api/v1/leads/import", post(import_handler::<S>))
        .with_state(service)
}

pub(crate) async fn import_handler<S>(
    State(service): State<Arc<LeadImportService<S>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ImportError>
where
    S: LeadStore + 'static,
{
    let upload = read_upload(multipart?)
        .await?
        .ok_or(ImportError::MissingFile)?;

    let outcome = service.import_csv(&upload).await?;
    let status = match outcome {
        ImportOutcome::Committed { .. } => StatusCode::OK,
        ImportOutcome::Rejected { .. } => StatusCode::BAD_REQUEST,
    };

    Ok((status, Json(outcome.body())).into_response())
}

// Other form fields are skipped; the first `file` field wins.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(Some(field.bytes().await?));
        }
    }

    Ok(None)
}
