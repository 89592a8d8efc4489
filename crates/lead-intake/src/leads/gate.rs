use super::domain::{NormalizedLead, RowError};

/// Admission decision for a whole upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Every row validated; leads in file order.
    Accepted(Vec<NormalizedLead>),
    /// At least one row failed; every failure in file order. Valid rows are dropped.
    Rejected(Vec<RowError>),
}

/// All-or-nothing gate: a single bad row rejects the batch.
pub fn admit<I>(results: I) -> Admission
where
    I: IntoIterator<Item = Result<NormalizedLead, RowError>>,
{
    let mut accepted = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(lead) => accepted.push(lead),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Admission::Accepted(accepted)
    } else {
        Admission::Rejected(errors)
    }
}
