use regex::Regex;
use std::num::ParseIntError;
use std::sync::OnceLock;

use super::domain::{
    LeadRow, LeadViolation, NormalizedLead, RowError, DEFAULT_STATUS, SYSTEM_OWNER,
};

static PHONE_PATTERN: OnceLock<Regex> = OnceLock::new();
static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

const MIN_FULL_NAME_CHARS: usize = 2;
const BHK_REQUIRED_FOR: &[&str] = &["Apartment", "Villa"];

/// Human-facing line number of the zero-based data row `index` (the header is line 1).
pub fn row_number(index: usize) -> usize {
    index + 2
}

/// Checks one row against the lead rules and normalizes it. Only the first broken rule
/// is reported. Pure: the outcome depends on nothing but `row` and `index`.
pub fn validate_row(row: &LeadRow, index: usize) -> Result<NormalizedLead, RowError> {
    normalize(row).map_err(|violation| RowError::new(row_number(index), violation))
}

fn normalize(row: &LeadRow) -> Result<NormalizedLead, LeadViolation> {
    let full_name = row
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| name.chars().count() >= MIN_FULL_NAME_CHARS)
        .ok_or(LeadViolation::FullName)?;

    let phone = row
        .phone
        .as_deref()
        .filter(|phone| phone_pattern().is_match(phone))
        .ok_or(LeadViolation::Phone)?;

    if let Some(email) = row.email.as_deref() {
        if !email_pattern().is_match(email) {
            return Err(LeadViolation::Email);
        }
    }

    let needs_bhk = row
        .property_type
        .as_deref()
        .is_some_and(|kind| BHK_REQUIRED_FOR.contains(&kind));
    if needs_bhk && row.bhk.is_none() {
        return Err(LeadViolation::MissingBhk);
    }

    let budget_min = parse_budget(row.budget_min.as_deref());
    let budget_max = parse_budget(row.budget_max.as_deref());
    if let (Ok(Some(min)), Ok(Some(max))) = (&budget_min, &budget_max) {
        if max < min {
            return Err(LeadViolation::BudgetRange);
        }
    }
    let budget_min = budget_min.map_err(|_| LeadViolation::Budget { field: "budgetMin" })?;
    let budget_max = budget_max.map_err(|_| LeadViolation::Budget { field: "budgetMax" })?;

    Ok(NormalizedLead {
        full_name: full_name.to_string(),
        email: row.email.as_deref().map(|email| email.trim().to_string()),
        phone: phone.to_string(),
        city: row.city.clone(),
        property_type: row.property_type.clone(),
        bhk: row.bhk.clone(),
        purpose: row.purpose.clone(),
        budget_min,
        budget_max,
        timeline: row.timeline.clone(),
        source: row.source.clone(),
        status: row
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        notes: row.notes.clone(),
        tags: split_tags(row.tags.as_deref()),
        owner_id: SYSTEM_OWNER.to_string(),
    })
}

// Blank (or whitespace-only) budgets are absent; anything else must be a whole number.
fn parse_budget(raw: Option<&str>) -> Result<Option<i64>, ParseIntError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::parse::<i64>)
        .transpose()
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|tags| tags.split(',').map(|tag| tag.trim().to_string()).collect())
        .unwrap_or_default()
}

fn phone_pattern() -> &'static Regex {
    PHONE_PATTERN
        .get_or_init(|| Regex::new(r"^[0-9]{10,15}$").expect("phone pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"))
}
