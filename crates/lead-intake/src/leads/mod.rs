//! Bulk CSV lead import.
//!
//! An upload moves through four stages, strictly in order: the decoder turns bytes into
//! header-keyed rows, the validator checks and normalizes each row on its own, the gate
//! rejects the whole batch if any row failed, and the store commits every lead together
//! with its history entry in one transaction.

pub mod decoder;
pub mod domain;
pub mod gate;
pub mod router;
pub mod service;
pub mod store;
pub mod validator;

#[cfg(test)]
mod tests;

pub use decoder::{decode_rows, DecodeError};
pub use domain::{
    ImportOutcome, LeadRow, LeadViolation, NormalizedLead, RowError, DEFAULT_STATUS, SYSTEM_OWNER,
};
pub use gate::{admit, Admission};
pub use router::{lead_import_router, UPLOAD_FIELD};
pub use service::{ImportError, LeadImportService};
pub use store::{LeadStore, SqliteLeadStore, StoreError};
pub use validator::{row_number, validate_row};
