//! Pure calendar arithmetic shared by the expander and the occupancy builder.
//!
//! Numeric conventions follow the stored event records: weekdays are numbered
//! with **Sunday = 0**, months are zero-based (`January = 0`). All arithmetic is
//! on UTC calendar dates; time-of-day only enters via [`parse_starting_time`].

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Weekday};

use crate::error::{CalendarError, Result};

/// Weekday tags as stored in `recurWeekly_days`, indexed by their number.
pub const WEEKDAY_TAGS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Month names as stored in yearly rules, indexed by their zero-based number.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Convert a weekday tag (`"Sun"`..`"Sat"`) to its number, Sunday = 0.
///
/// # Errors
/// Returns [`CalendarError::InvalidWeekday`] for any other tag.
pub fn weekday_to_number(tag: &str) -> Result<u32> {
    WEEKDAY_TAGS
        .iter()
        .position(|t| *t == tag)
        .map(|i| i as u32)
        .ok_or_else(|| CalendarError::InvalidWeekday(tag.to_string()))
}

/// Inverse of [`weekday_to_number`].
pub fn number_to_weekday(n: u32) -> Result<&'static str> {
    WEEKDAY_TAGS
        .get(n as usize)
        .copied()
        .ok_or_else(|| CalendarError::InvalidWeekday(n.to_string()))
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Parse a weekday tag straight into a `chrono::Weekday`.
pub fn weekday_from_tag(tag: &str) -> Result<Weekday> {
    Ok(WEEKDAYS[weekday_to_number(tag)? as usize])
}

/// Inverse of [`weekday_from_tag`].
pub fn weekday_tag(weekday: Weekday) -> &'static str {
    WEEKDAY_TAGS[weekday.num_days_from_sunday() as usize]
}

/// Convert a month name (`"January"`..`"December"`) to its zero-based number.
///
/// # Errors
/// Returns [`CalendarError::InvalidMonth`] for any other name.
pub fn month_to_number(name: &str) -> Result<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32)
        .ok_or_else(|| CalendarError::InvalidMonth(name.to_string()))
}

/// Inverse of [`month_to_number`].
pub fn number_to_month(n: u32) -> Result<&'static str> {
    MONTH_NAMES
        .get(n as usize)
        .copied()
        .ok_or_else(|| CalendarError::InvalidMonth(n.to_string()))
}

/// Number of days in a zero-based month, or 0 when `month0` is out of range.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    if month0 > 11 {
        return 0;
    }
    let (next_year, next_month) = if month0 == 11 {
        (year + 1, 1)
    } else {
        (year, month0 + 2)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// The date of the `n`-th (1-indexed) `weekday` within a zero-based month.
///
/// Returns `None` when `n` is zero or the month has fewer than `n` such
/// weekdays (e.g. a 5th Monday in a month with four Mondays). The result is
/// never rolled into the following month.
pub fn ordinal_weekday_of_month(
    year: i32,
    month0: u32,
    weekday: Weekday,
    n: u32,
) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    let offset = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    let day = 1 + offset + 7 * (n - 1);
    if day > days_in_month(year, month0) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month0 + 1, day)
}

/// First day of the month `n` months after the month containing `date`.
pub fn add_months_to_start(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(n))
}

/// January 1st of the year `n` years after the year containing `date`.
pub fn add_years_to_start(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    let year = date.year().checked_add(i32::try_from(n).ok()?)?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Parse a 4-digit 24h `HHMM` starting time.
///
/// # Errors
/// Returns [`CalendarError::InvalidStartingTime`] unless the input is exactly
/// four ASCII digits with hours in `0..=23` and minutes in `0..=59`.
pub fn parse_starting_time(raw: &str) -> Result<NaiveTime> {
    let invalid = || CalendarError::InvalidStartingTime(raw.to_string());
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: u32 = raw[..2].parse().map_err(|_| invalid())?;
    let minutes: u32 = raw[2..].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}
