use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use super::decoder::{decode_rows, DecodeError};
use super::domain::ImportOutcome;
use super::gate::{admit, Admission};
use super::store::{LeadStore, StoreError};
use super::validator::validate_row;

/// Runs uploads through decode, validate, gate and commit.
pub struct LeadImportService<S> {
    store: Arc<S>,
}

impl<S> LeadImportService<S>
where
    S: LeadStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Imports one CSV upload. Row problems come back as `ImportOutcome::Rejected`;
    /// `Err` is reserved for unreadable input and store failures.
    pub async fn import_csv(&self, bytes: &[u8]) -> Result<ImportOutcome, ImportError> {
        let rows = decode_rows(bytes)?;
        let row_count = rows.len();

        let results = rows
            .iter()
            .enumerate()
            .map(|(index, row)| validate_row(row, index));

        match admit(results) {
            Admission::Rejected(errors) => {
                warn!(rows = row_count, rejected = errors.len(), "lead import rejected");
                Ok(ImportOutcome::Rejected { errors })
            }
            Admission::Accepted(leads) => {
                let count = self
                    .store
                    .create_many_with_audit(&leads)
                    .await
                    .inspect_err(|err| {
                        error!(error = %err, rows = row_count, "lead import commit failed")
                    })?;
                info!(count, "lead import committed");
                Ok(ImportOutcome::Committed { count })
            }
        }
    }
}

/// Error raised while handling an import request.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No file uploaded")]
    MissingFile,
    #[error(transparent)]
    Request(#[from] MultipartRejection),
    #[error(transparent)]
    Upload(#[from] MultipartError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ImportError::MissingFile | ImportError::Decode(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ImportError::Request(rejection) => (rejection.status(), rejection.body_text()),
            ImportError::Upload(err) => (err.status(), err.body_text()),
            // Details are logged by the service; callers only learn that nothing was saved.
            ImportError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to import leads".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
