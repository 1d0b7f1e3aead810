// src/domain/aggregate.rs

//! KPI counts and chart series computed from a lead snapshot.
//!
//! Everything here is pure: the same slice always yields the same numbers,
//! and nothing is cached between snapshots.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::warn;

use crate::domain::lead::Lead;

/// The weekly chart only ever shows this many buckets.
pub const WEEKLY_SERIES_CAP: usize = 8;

/// Insertion-ordered key -> count map.
/// Keys keep the position of their first occurrence.
#[derive(Debug, Default)]
struct OrderedCounter {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl OrderedCounter {
    fn bump(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    fn into_entries(self) -> Vec<(String, usize)> {
        self.entries
    }
}

pub fn count_total(leads: &[Lead]) -> usize {
    leads.len()
}

pub fn count_hot(leads: &[Lead]) -> usize {
    leads.iter().filter(|l| l.hot).count()
}

/// Leads that opened the message or clicked the link.
pub fn count_engaged(leads: &[Lead]) -> usize {
    leads.iter().filter(|l| l.is_engaged()).count()
}

/// Lead count per work type, in first-seen order of the type.
pub fn histogram_by_type(leads: &[Lead]) -> Vec<(String, usize)> {
    let mut counter = OrderedCounter::default();
    for lead in leads {
        counter.bump(&lead.type_travaux);
    }
    counter.into_entries()
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Chart label for a week bucket, "dd/MM".
pub fn week_label(start: NaiveDate) -> String {
    start.format("%d/%m").to_string()
}

/// Lead count per week, labelled by the week's Monday.
///
/// Buckets are appended in the order they are first met in `leads`, and only
/// the final [`WEEKLY_SERIES_CAP`] buckets are returned. With the backend's
/// newest-first ordering this is not the same as the eight most recent weeks.
///
/// Leads without a usable timestamp are left out and logged.
pub fn weekly_series(leads: &[Lead]) -> Vec<(String, usize)> {
    let mut counter = OrderedCounter::default();
    for lead in leads {
        match lead.local_day() {
            Some(day) => counter.bump(&week_label(week_start(day))),
            None => warn!(
                lead_id = %lead.id,
                timestamp = %lead.timestamp_raw,
                "skipping lead with unparseable timestamp in weekly series"
            ),
        }
    }

    let mut entries = counter.into_entries();
    if entries.len() > WEEKLY_SERIES_CAP {
        entries.drain(..entries.len() - WEEKLY_SERIES_CAP);
    }
    entries
}

/// (hot, everything else)
pub fn hot_cold_split(leads: &[Lead]) -> (usize, usize) {
    let hot = count_hot(leads);
    (hot, count_total(leads) - hot)
}

/// Every aggregate the dashboard shows, computed in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub hot: usize,
    pub engaged: usize,
    pub by_type: Vec<(String, usize)>,
    pub weekly: Vec<(String, usize)>,
    pub hot_cold: (usize, usize),
}

impl DashboardStats {
    pub fn compute(leads: &[Lead]) -> Self {
        Self {
            total: count_total(leads),
            hot: count_hot(leads),
            engaged: count_engaged(leads),
            by_type: histogram_by_type(leads),
            weekly: weekly_series(leads),
            hot_cold: hot_cold_split(leads),
        }
    }
}
