//! Occupancy: the 30-minute slots during which an event is active.
//!
//! Each occurrence date is combined with the rule's starting time; every slot
//! boundary from the (floored) start to the end instant, inclusive, is marked
//! active. Overlapping occurrences collapse into the same slots.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expander::{expand, DateWindow};
use crate::rule::EventRule;

/// Slot resolution in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Canonical slot key format, e.g. `2024-01-01T09:30:00Z`.
pub const SLOT_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A contiguous run of active slots, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Deduplicated, ordered set of active slot instants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    slots: BTreeSet<DateTime<Utc>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the slot containing `instant` is active.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.slots.contains(&quantize(instant))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.slots.iter()
    }

    pub fn insert(&mut self, instant: DateTime<Utc>) -> bool {
        self.slots.insert(quantize(instant))
    }

    /// Union with another occupancy (e.g. several rules on one calendar row).
    pub fn extend(&mut self, other: &Occupancy) {
        self.slots.extend(other.slots.iter().copied());
    }

    /// Canonical string keys, in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.format(SLOT_KEY_FORMAT).to_string())
            .collect()
    }

    /// Collapse consecutive slots into ranges for timeline bars.
    pub fn ranges(&self) -> Vec<ActiveRange> {
        let step = Duration::minutes(SLOT_MINUTES);
        let mut ranges: Vec<ActiveRange> = Vec::new();
        for &slot in &self.slots {
            if let Some(last) = ranges.last_mut() {
                if slot - last.end == step {
                    last.end = slot;
                    continue;
                }
            }
            ranges.push(ActiveRange {
                start: slot,
                end: slot,
            });
        }
        ranges
    }

    /// Active slot times grouped by UTC date, for calendar cells.
    pub fn by_day(&self) -> BTreeMap<NaiveDate, Vec<NaiveTime>> {
        let mut days: BTreeMap<NaiveDate, Vec<NaiveTime>> = BTreeMap::new();
        for slot in &self.slots {
            days.entry(slot.date_naive()).or_default().push(slot.time());
        }
        days
    }
}

impl FromIterator<DateTime<Utc>> for Occupancy {
    fn from_iter<I: IntoIterator<Item = DateTime<Utc>>>(iter: I) -> Self {
        let mut occupancy = Occupancy::new();
        for instant in iter {
            occupancy.insert(instant);
        }
        occupancy
    }
}

/// Floor an instant to its 30-minute slot boundary.
pub fn quantize(instant: DateTime<Utc>) -> DateTime<Utc> {
    let naive = instant.naive_utc();
    let minute = naive.minute() - naive.minute() % SLOT_MINUTES as u32;
    let floored = naive
        .date()
        .and_hms_opt(naive.hour(), minute, 0)
        .unwrap_or(naive);
    floored.and_utc()
}

/// Build the occupancy of a set of occurrence dates.
///
/// For each date the active span runs from `date + starting_time` to
/// `duration_minutes` later; every slot boundary in that span, end inclusive,
/// is marked active.
pub fn build_occupancy(
    occurrences: &[NaiveDate],
    starting_time: NaiveTime,
    duration_minutes: u32,
) -> Occupancy {
    let step = Duration::minutes(SLOT_MINUTES);
    let duration = Duration::minutes(i64::from(duration_minutes));
    let mut occupancy = Occupancy::new();

    for date in occurrences {
        let start: NaiveDateTime = date.and_time(starting_time);
        // Spans running past the representable range stop at its end.
        let end = start
            .checked_add_signed(duration)
            .unwrap_or(NaiveDateTime::MAX)
            .and_utc();
        let mut next = Some(quantize(start.and_utc()));
        while let Some(slot) = next.filter(|slot| *slot <= end) {
            occupancy.slots.insert(slot);
            next = slot.checked_add_signed(step);
        }
    }

    occupancy
}

/// Expand `rule` over `window` and build its occupancy in one step.
///
/// # Errors
/// Returns the rule's validation error, or an invalid starting time.
pub fn occupancy_for_rule(rule: &EventRule, window: &DateWindow) -> Result<Occupancy> {
    let starting_time = rule.start_time()?;
    let dates = expand(rule, window)?;
    Ok(build_occupancy(&dates, starting_time, rule.duration_minutes))
}
