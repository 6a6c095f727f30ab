//! Recurrence expansion: an event rule turned into concrete occurrence dates.
//!
//! Enumeration always starts at the rule's `startingDate`, even when that lies
//! before the visible window; callers filter by `window.start` themselves. The
//! window end is the only bound, so every recurring rule terminates.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date_math::{add_months_to_start, add_years_to_start, ordinal_weekday_of_month};
use crate::error::Result;
use crate::rule::{EventRule, MonthlyOn, Recurrence, YearlyOn};

/// Inclusive range of visible calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Expand a rule into its ascending occurrence dates up to `window.end`.
///
/// A non-recurring rule yields exactly its `startingDate`, whatever the window.
///
/// # Errors
/// Propagates the validation errors of [`EventRule::recurrence`].
pub fn expand(rule: &EventRule, window: &DateWindow) -> Result<Vec<NaiveDate>> {
    let dates: Vec<NaiveDate> = occurrences(rule, window)?.collect();
    debug!(rule = %rule.id, count = dates.len(), end = %window.end, "expanded recurrence");
    Ok(dates)
}

/// Lazy form of [`expand`].
pub fn occurrences(rule: &EventRule, window: &DateWindow) -> Result<Occurrences> {
    Ok(Occurrences::new(rule.recurrence()?, rule.starting_date, window.end))
}

/// Iterator over the occurrence dates of one recurrence.
///
/// Cloning yields an independent iterator at the same position; [`restart`]
/// rewinds to the first occurrence.
///
/// [`restart`]: Occurrences::restart
#[derive(Debug, Clone)]
pub struct Occurrences {
    recurrence: Recurrence,
    start: NaiveDate,
    end: NaiveDate,
    cursor: Option<NaiveDate>,
    /// Days already scanned in the current weekly block.
    block_day: u32,
}

impl Occurrences {
    pub fn new(recurrence: Recurrence, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            recurrence,
            start,
            end,
            cursor: Some(start),
            block_day: 0,
        }
    }

    pub fn restart(&mut self) {
        self.cursor = Some(self.start);
        self.block_day = 0;
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let cursor = self.cursor?;

            if cursor > self.end && self.recurrence.is_recurring() {
                self.cursor = None;
                return None;
            }

            match &self.recurrence {
                Recurrence::Once => {
                    self.cursor = None;
                    return Some(cursor);
                }
                Recurrence::Daily { every } => {
                    self.cursor = cursor.checked_add_days(Days::new(u64::from(*every)));
                    return Some(cursor);
                }
                Recurrence::Weekly { every, days } => {
                    let hit = days.contains(&(cursor.weekday().num_days_from_sunday() as u8));
                    let mut next = cursor.succ_opt();
                    self.block_day += 1;
                    if self.block_day == 7 {
                        // Block finished: skip the weeks that are not scanned.
                        self.block_day = 0;
                        let skip = 7 * u64::from(*every - 1);
                        next = next.and_then(|d| d.checked_add_days(Days::new(skip)));
                    }
                    self.cursor = next;
                    if hit {
                        return Some(cursor);
                    }
                }
                Recurrence::Monthly {
                    every,
                    on: MonthlyOn::DayOfMonth(day),
                } => {
                    let hit = next_day_of_month(cursor, *day, self.end);
                    self.cursor = hit.and_then(|d| add_months_to_start(d, *every));
                    return hit;
                }
                Recurrence::Monthly {
                    every,
                    on: MonthlyOn::NthWeekday { week, weekday },
                } => {
                    let target = ordinal_weekday_of_month(cursor.year(), cursor.month0(), *weekday, *week);
                    let (next, hit) = step_towards(cursor, target, *every, add_months_to_start);
                    self.cursor = next;
                    if hit {
                        return Some(cursor);
                    }
                }
                Recurrence::Yearly {
                    every,
                    on: YearlyOn::Date { month0, day },
                } => {
                    let hit = next_date_of_year(cursor, *month0, *day, self.end);
                    self.cursor = hit.and_then(|d| add_years_to_start(d, *every));
                    return hit;
                }
                Recurrence::Yearly {
                    every,
                    on: YearlyOn::NthWeekday { month0, week, weekday },
                } => {
                    let target = ordinal_weekday_of_month(cursor.year(), *month0, *weekday, *week);
                    let (next, hit) = step_towards(cursor, target, *every, add_years_to_start);
                    self.cursor = next;
                    if hit {
                        return Some(cursor);
                    }
                }
            }
        }
    }
}

/// One step of the ordinal-weekday scan within the cursor's period (month or year).
///
/// - no target this period: move to the next period's start
/// - target already passed: jump `every` periods ahead
/// - cursor on target: report a hit and jump `every` periods ahead
/// - target still ahead: move the cursor onto it
fn step_towards(
    cursor: NaiveDate,
    target: Option<NaiveDate>,
    every: u32,
    jump: fn(NaiveDate, u32) -> Option<NaiveDate>,
) -> (Option<NaiveDate>, bool) {
    match target {
        None => (jump(cursor, 1), false),
        Some(t) if cursor > t => (jump(cursor, every), false),
        Some(t) if cursor == t => (jump(cursor, every), true),
        Some(t) => (Some(t), false),
    }
}

/// First date on or after `from` (and not after `end`) whose day-of-month is
/// `day`. Months without that day are passed over, never clamped.
fn next_day_of_month(from: NaiveDate, day: u32, end: NaiveDate) -> Option<NaiveDate> {
    let mut month_start = from.with_day(1)?;
    while month_start <= end {
        if let Some(candidate) = month_start.with_day(day) {
            if candidate >= from {
                return (candidate <= end).then_some(candidate);
            }
        }
        month_start = add_months_to_start(month_start, 1)?;
    }
    None
}

/// First date on or after `from` (and not after `end`) falling on the given
/// zero-based month and day. Years without that date (February 29) are passed over.
fn next_date_of_year(from: NaiveDate, month0: u32, day: u32, end: NaiveDate) -> Option<NaiveDate> {
    (from.year()..=end.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month0 + 1, day))
        .find(|candidate| *candidate >= from)
        .filter(|candidate| *candidate <= end)
}
