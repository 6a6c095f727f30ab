//! Error types for liveops-calendar operations.

use thiserror::Error;

/// Every variant is an invalid-argument failure: the rule as configured cannot
/// be expanded faithfully, so nothing is clamped or defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid weekday tag: {0}")]
    InvalidWeekday(String),

    #[error("Invalid month name: {0}")]
    InvalidMonth(String),

    #[error("Invalid starting time (expected HHMM): {0}")]
    InvalidStartingTime(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
