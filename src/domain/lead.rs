// src/domain/lead.rs

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Wire value the backend uses for a true flag.
pub const YES: &str = "oui";

/// One lead row exactly as the backend stores it.
/// Flags are strings ("oui" / anything else) because that is the backend's representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub type_travaux: String,
    #[serde(default, deserialize_with = "number_or_null")]
    pub surface: f64,
    #[serde(default)]
    pub localisation: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ouvert: String,
    #[serde(default)]
    pub clique: String,
    #[serde(default)]
    pub devis_estimatif: Option<String>,
    #[serde(default)]
    pub lead_chaud: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// PostgREST returns numeric columns as numbers, but hand-edited rows sometimes
/// carry null or a numeric string.
fn number_or_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => n,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

/// Workflow state of a lead. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    Nouveau,
    Repondu,
    Chaud,
    Other(String),
}

impl LeadStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "nouveau" => LeadStatus::Nouveau,
            "répondu" => LeadStatus::Repondu,
            "chaud" => LeadStatus::Chaud,
            other => LeadStatus::Other(other.to_string()),
        }
    }

    /// The exact string the backend sent.
    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::Nouveau => "nouveau",
            LeadStatus::Repondu => "répondu",
            LeadStatus::Chaud => "chaud",
            LeadStatus::Other(s) => s,
        }
    }
}

/// A lead after normalization: real booleans, a parsed timestamp
/// shifted into the dashboard's display offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: String,
    pub nom: String,
    pub email: String,
    pub telephone: String,
    pub type_travaux: String,
    pub surface: f64,
    pub localisation: String,
    pub timestamp_raw: String,
    /// `None` when the backend value was missing or unparseable.
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub status: LeadStatus,
    pub opened: bool,
    pub clicked: bool,
    pub devis_estimatif: Option<String>,
    pub hot: bool,
    pub assigned_to: Option<String>,
}

impl Lead {
    pub fn from_record(record: LeadRecord, offset: FixedOffset) -> Self {
        let timestamp = parse_timestamp(&record.timestamp).map(|t| t.with_timezone(&offset));

        Self {
            timestamp,
            status: LeadStatus::parse(&record.status),
            opened: record.ouvert == YES,
            clicked: record.clique == YES,
            hot: record.lead_chaud == YES,
            devis_estimatif: record.devis_estimatif.filter(|d| !d.is_empty()),
            id: record.id,
            nom: record.nom,
            email: record.email,
            telephone: record.telephone,
            type_travaux: record.type_travaux,
            surface: record.surface,
            localisation: record.localisation,
            timestamp_raw: record.timestamp,
            assigned_to: record.assigned_to,
        }
    }

    /// Calendar day of the lead in the display offset.
    pub fn local_day(&self) -> Option<NaiveDate> {
        self.timestamp.map(|t| t.date_naive())
    }

    /// Whether the lead engaged with an outbound message (opened or clicked).
    pub fn is_engaged(&self) -> bool {
        self.clicked || self.opened
    }
}

/// Normalize a batch of backend rows, preserving order.
pub fn normalize_all(records: Vec<LeadRecord>, offset: FixedOffset) -> Vec<Lead> {
    records
        .into_iter()
        .map(|r| Lead::from_record(r, offset))
        .collect()
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse the timestamp formats the backend is known to emit.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres text output: "2024-01-10 10:00:00.123+00"
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
