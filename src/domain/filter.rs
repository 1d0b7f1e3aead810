// src/domain/filter.rs

use chrono::NaiveDate;

use crate::domain::lead::Lead;

/// Status values the filter select offers, with their labels.
pub const STATUS_OPTIONS: [(&str, &str); 3] = [
    ("nouveau", "Nouveau"),
    ("répondu", "Répondu"),
    ("chaud", "Chaud"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// Exact, case-sensitive match on the raw status string.
    Only(String),
}

impl StatusFilter {
    /// `""` and `"all"` both mean no status filtering.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => StatusFilter::All,
            other => StatusFilter::Only(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(s) => s,
        }
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => lead.status.as_str() == s,
        }
    }
}

/// Parse the `date` query value ("YYYY-MM-DD"); empty means no date filter.
pub fn parse_date_filter(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some)
}

/// Narrow `leads` by status and calendar day, keeping their relative order.
///
/// The day comparison is on the lead's local calendar day, so a lead at
/// 00:00 the next day does not match. Leads without a parsed timestamp never
/// match an active date filter.
pub fn apply_filters(leads: &[Lead], status: &StatusFilter, date: Option<NaiveDate>) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| status.matches(lead))
        .filter(|lead| match date {
            Some(day) => lead.local_day() == Some(day),
            None => true,
        })
        .cloned()
        .collect()
}
