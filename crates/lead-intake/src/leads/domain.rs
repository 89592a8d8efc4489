use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// Owner recorded on every imported lead and its history entry.
pub const SYSTEM_OWNER: &str = "SYSTEM";

/// Status assigned to leads whose row leaves `status` blank.
pub const DEFAULT_STATUS: &str = "New";

/// One CSV data line keyed by header name. Empty cells and missing columns are `None`;
/// values are kept exactly as they appeared in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRow {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub bhk: Option<String>,
    pub purpose: Option<String>,
    pub budget_min: Option<String>,
    pub budget_max: Option<String>,
    pub timeline: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
}

/// Validated lead ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLead {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub bhk: Option<String>,
    pub purpose: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub owner_id: String,
}

/// Business rule a row broke. The display text is what callers see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadViolation {
    #[error("Invalid fullName")]
    FullName,
    #[error("Invalid phone")]
    Phone,
    #[error("Invalid email")]
    Email,
    #[error("BHK required for Apartment/Villa")]
    MissingBhk,
    #[error("budgetMax must be >= budgetMin")]
    BudgetRange,
    #[error("Invalid {field}")]
    Budget { field: &'static str },
}

/// A rejected row, numbered the way a spreadsheet shows it (header is line 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub violation: LeadViolation,
}

impl RowError {
    pub fn new(row: usize, violation: LeadViolation) -> Self {
        Self { row, violation }
    }
}

impl Serialize for RowError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("RowError", 2)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("error", &self.violation.to_string())?;
        state.end()
    }
}

/// Result of one bulk import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Committed { count: usize },
    Rejected { errors: Vec<RowError> },
}

impl ImportOutcome {
    /// JSON payload returned to API and CLI callers.
    pub fn body(&self) -> Value {
        match self {
            ImportOutcome::Committed { count } => json!({ "success": true, "count": count }),
            ImportOutcome::Rejected { errors } => json!({ "errors": errors }),
        }
    }
}
