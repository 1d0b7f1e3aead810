// src/domain/hot.rs

use crate::domain::lead::Lead;

/// Leads flagged hot, in input order.
pub fn select_hot(leads: &[Lead]) -> Vec<Lead> {
    leads.iter().filter(|l| l.hot).cloned().collect()
}

/// One "<nom>: <telephone>" line per lead.
pub fn format_phone_list(hot: &[Lead]) -> String {
    hot.iter()
        .map(|l| format!("{}: {}", l.nom, l.telephone))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emails joined with ", ". Duplicates are kept.
pub fn format_email_list(hot: &[Lead]) -> String {
    hot.iter()
        .map(|l| l.email.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
