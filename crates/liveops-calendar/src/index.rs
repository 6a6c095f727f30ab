//! Per-day lookups used when painting calendar cells and Gantt bars.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Format of the date keys stored in an [`OccurrenceIndex`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Rule id → formatted occurrence dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceIndex {
    by_rule: HashMap<String, HashSet<String>>,
}

impl OccurrenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) the dates of one rule.
    pub fn insert(&mut self, rule_id: &str, occurrences: &[NaiveDate]) {
        let dates = self.by_rule.entry(rule_id.to_string()).or_default();
        dates.extend(occurrences.iter().map(|d| format_date_key(*d)));
    }

    /// Whether `rule_id` fires on `date`.
    pub fn fires_on(&self, rule_id: &str, date: NaiveDate) -> bool {
        self.by_rule
            .get(rule_id)
            .is_some_and(|dates| dates.contains(&format_date_key(date)))
    }

    pub fn dates(&self, rule_id: &str) -> Option<&HashSet<String>> {
        self.by_rule.get(rule_id)
    }

    pub fn len(&self) -> usize {
        self.by_rule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_rule.is_empty()
    }
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Build an index from `(rule id, occurrences)` pairs.
pub fn build_occurrence_index<'a, I>(entries: I) -> OccurrenceIndex
where
    I: IntoIterator<Item = (&'a str, &'a [NaiveDate])>,
{
    let mut index = OccurrenceIndex::new();
    for (rule_id, occurrences) in entries {
        index.insert(rule_id, occurrences);
    }
    index
}

/// Covered fraction of one 24h day cell, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayFillSpan {
    pub start_percent: f64,
    pub end_percent: f64,
}

impl DayFillSpan {
    /// The degenerate span of a day the event does not touch.
    pub const EMPTY: DayFillSpan = DayFillSpan {
        start_percent: 0.0,
        end_percent: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.end_percent <= self.start_percent
    }
}

/// The occurrence that can still be active on `day`: the same-day occurrence
/// when there is one, otherwise the latest one before it.
pub fn most_recent_occurrence(occurrences: &[NaiveDate], day: NaiveDate) -> Option<NaiveDate> {
    if occurrences.contains(&day) {
        return Some(day);
    }
    occurrences.iter().copied().filter(|d| *d < day).max()
}

/// How much of `day` the event started on `occurrence` covers, in percent of
/// the day, clamped to `[0, 100]`.
///
/// Returns [`DayFillSpan::EMPTY`] when there is no occurrence or its active
/// span does not intersect the day.
pub fn compute_day_fill_span(
    occurrence: Option<NaiveDate>,
    day: NaiveDate,
    starting_time: NaiveTime,
    duration_minutes: u32,
) -> DayFillSpan {
    let Some(occurrence) = occurrence else {
        return DayFillSpan::EMPTY;
    };

    let start = occurrence.and_time(starting_time);
    let end = start
        .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
        .unwrap_or(NaiveDateTime::MAX);
    let day_start = day.and_time(NaiveTime::MIN);
    let day_end = day_start
        .checked_add_signed(Duration::days(1))
        .unwrap_or(NaiveDateTime::MAX);
    if end <= day_start || start >= day_end {
        return DayFillSpan::EMPTY;
    }

    let percent = |instant: NaiveDateTime| {
        let minutes = (instant - day_start).num_minutes() as f64;
        (minutes / MINUTES_PER_DAY * 100.0).clamp(0.0, 100.0)
    };
    DayFillSpan {
        start_percent: percent(start),
        end_percent: percent(end),
    }
}
