//! # liveops-calendar
//!
//! Recurrence expansion and occupancy for liveops calendar events.
//!
//! An [`EventRule`] is expanded into concrete UTC dates bounded by a visible
//! [`DateWindow`], and those dates are turned into 30-minute occupancy slots
//! and per-day fill spans for calendar and timeline views. Everything here is
//! pure and synchronous; callers re-run it on every render.
//!
//! ## Modules
//!
//! - [`date_math`]: weekday/month numbering, ordinal weekdays, period jumps
//! - [`rule`]: stored event rule and its validated [`Recurrence`]
//! - [`expander`]: rule → ascending occurrence dates
//! - [`occupancy`]: occurrence dates → deduplicated 30-minute slots
//! - [`index`]: per-rule date lookup and day-cell fill spans
//! - [`error`]: Error types

pub mod date_math;
pub mod error;
pub mod expander;
pub mod index;
pub mod occupancy;
pub mod rule;

pub use error::CalendarError;
pub use expander::{expand, occurrences, DateWindow, Occurrences};
pub use index::{
    build_occurrence_index, compute_day_fill_span, format_date_key, most_recent_occurrence,
    DayFillSpan, OccurrenceIndex,
};
pub use occupancy::{build_occupancy, occupancy_for_rule, ActiveRange, Occupancy};
pub use rule::{EventRule, MonthlyOn, RecurEveryType, Recurrence, YearlyOn};
