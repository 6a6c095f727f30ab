//! Event rules as stored by the liveops editor, and their validated form.
//!
//! [`EventRule`] mirrors the persisted record field-for-field, including the
//! mode-specific fields of every recurrence kind at once. [`EventRule::recurrence`]
//! reads only the fields that the rule's type and mode select and turns them
//! into a [`Recurrence`], rejecting anything that cannot be expanded faithfully.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::date_math::{self, days_in_month};
use crate::error::{CalendarError, Result};

/// Unit of the recurrence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurEveryType {
    Days,
    Weeks,
    Months,
    Years,
}

/// A calendar event rule, shaped exactly like the stored record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    pub id: String,
    /// UTC calendar date of the first occurrence.
    pub starting_date: NaiveDate,
    /// 24h `HHMM` string.
    pub starting_time: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recur_every_type: Option<RecurEveryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recur_every_n: Option<i64>,

    #[serde(rename = "recurWeekly_days", default)]
    pub recur_weekly_days: Vec<String>,

    #[serde(rename = "recurMonthly_mode", default)]
    pub recur_monthly_mode: u8,
    #[serde(rename = "recurMonthly_dayNum", default, skip_serializing_if = "Option::is_none")]
    pub recur_monthly_day_num: Option<u32>,
    #[serde(rename = "recurMonthly_recurOnWeekNum", default, skip_serializing_if = "Option::is_none")]
    pub recur_monthly_week_num: Option<u32>,
    #[serde(rename = "recurMonthly_recurOnWeekDay", default, skip_serializing_if = "Option::is_none")]
    pub recur_monthly_week_day: Option<String>,

    #[serde(rename = "recurYearly_mode", default)]
    pub recur_yearly_mode: u8,
    #[serde(rename = "recurYearly_month", default, skip_serializing_if = "Option::is_none")]
    pub recur_yearly_month: Option<String>,
    #[serde(rename = "recurYearly_dayNum", default, skip_serializing_if = "Option::is_none")]
    pub recur_yearly_day_num: Option<u32>,
    #[serde(rename = "recurYearly_recurOnWeekNum", default, skip_serializing_if = "Option::is_none")]
    pub recur_yearly_week_num: Option<u32>,
    #[serde(rename = "recurYearly_recurOnWeekDay", default, skip_serializing_if = "Option::is_none")]
    pub recur_yearly_week_day: Option<String>,
    #[serde(rename = "recurYearly_recurOnMonth", default, skip_serializing_if = "Option::is_none")]
    pub recur_yearly_week_month: Option<String>,
}

/// Which day of the month a monthly rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyOn {
    /// Fixed day-of-month (`recurMonthly_mode = 0`).
    DayOfMonth(u32),
    /// The `week`-th `weekday` of the month (`recurMonthly_mode = 1`).
    NthWeekday { week: u32, weekday: Weekday },
}

/// Which day of the year a yearly rule fires on. Months are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearlyOn {
    /// Fixed month and day (`recurYearly_mode = 0`).
    Date { month0: u32, day: u32 },
    /// The `week`-th `weekday` of a named month (`recurYearly_mode = 1`).
    NthWeekday {
        month0: u32,
        week: u32,
        weekday: Weekday,
    },
}

/// A validated recurrence, one variant per stored type/mode combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    Once,
    Daily { every: u32 },
    Weekly { every: u32, days: BTreeSet<u8> },
    Monthly { every: u32, on: MonthlyOn },
    Yearly { every: u32, on: YearlyOn },
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::Once)
    }
}

/// The highest meaningful ordinal for "N-th weekday of the month".
const MAX_WEEK_NUM: u32 = 5;

impl EventRule {
    /// A non-recurring rule firing once on `starting_date`.
    pub fn new(
        id: impl Into<String>,
        starting_date: NaiveDate,
        starting_time: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            starting_date,
            starting_time: starting_time.into(),
            duration_minutes,
            ..Self::default()
        }
    }

    fn recurring(mut self, kind: RecurEveryType, every: i64) -> Self {
        self.is_recurring = true;
        self.recur_every_type = Some(kind);
        self.recur_every_n = Some(every);
        self
    }

    pub fn every_days(self, every: i64) -> Self {
        self.recurring(RecurEveryType::Days, every)
    }

    pub fn every_weeks(self, every: i64, days: &[&str]) -> Self {
        let mut rule = self.recurring(RecurEveryType::Weeks, every);
        rule.recur_weekly_days = days.iter().map(|d| d.to_string()).collect();
        rule
    }

    pub fn every_months_on_day(self, every: i64, day: u32) -> Self {
        let mut rule = self.recurring(RecurEveryType::Months, every);
        rule.recur_monthly_mode = 0;
        rule.recur_monthly_day_num = Some(day);
        rule
    }

    pub fn every_months_on_weekday(self, every: i64, week: u32, weekday: &str) -> Self {
        let mut rule = self.recurring(RecurEveryType::Months, every);
        rule.recur_monthly_mode = 1;
        rule.recur_monthly_week_num = Some(week);
        rule.recur_monthly_week_day = Some(weekday.to_string());
        rule
    }

    pub fn every_years_on_date(self, every: i64, month: &str, day: u32) -> Self {
        let mut rule = self.recurring(RecurEveryType::Years, every);
        rule.recur_yearly_mode = 0;
        rule.recur_yearly_month = Some(month.to_string());
        rule.recur_yearly_day_num = Some(day);
        rule
    }

    pub fn every_years_on_weekday(self, every: i64, month: &str, week: u32, weekday: &str) -> Self {
        let mut rule = self.recurring(RecurEveryType::Years, every);
        rule.recur_yearly_mode = 1;
        rule.recur_yearly_week_month = Some(month.to_string());
        rule.recur_yearly_week_num = Some(week);
        rule.recur_yearly_week_day = Some(weekday.to_string());
        rule
    }

    /// Parsed `startingTime`.
    pub fn start_time(&self) -> Result<NaiveTime> {
        date_math::parse_starting_time(&self.starting_time)
    }

    /// Validate the fields selected by type and mode into a [`Recurrence`].
    ///
    /// Fields belonging to other types or modes are ignored even when present
    /// and malformed.
    ///
    /// # Errors
    /// - [`CalendarError::InvalidRule`] for a missing type, `recurEveryN <= 0`,
    ///   an empty weekly day set, an unknown mode or out-of-range day/week numbers.
    /// - [`CalendarError::InvalidWeekday`] / [`CalendarError::InvalidMonth`] for
    ///   unknown tags.
    pub fn recurrence(&self) -> Result<Recurrence> {
        if !self.is_recurring {
            return Ok(Recurrence::Once);
        }

        let kind = self
            .recur_every_type
            .ok_or_else(|| self.invalid("recurring rule without recurEveryType"))?;
        let every = self.step()?;

        match kind {
            RecurEveryType::Days => Ok(Recurrence::Daily { every }),
            RecurEveryType::Weeks => {
                let days = self
                    .recur_weekly_days
                    .iter()
                    .map(|tag| date_math::weekday_to_number(tag).map(|n| n as u8))
                    .collect::<Result<BTreeSet<u8>>>()?;
                if days.is_empty() {
                    return Err(self.invalid("weekly rule without recurWeekly_days"));
                }
                Ok(Recurrence::Weekly { every, days })
            }
            RecurEveryType::Months => {
                let on = match self.recur_monthly_mode {
                    0 => {
                        let day = self
                            .recur_monthly_day_num
                            .ok_or_else(|| self.invalid("monthly rule without recurMonthly_dayNum"))?;
                        if !(1..=31).contains(&day) {
                            return Err(self.invalid(format!("day of month {day} out of range")));
                        }
                        MonthlyOn::DayOfMonth(day)
                    }
                    1 => MonthlyOn::NthWeekday {
                        week: self.week_num(self.recur_monthly_week_num)?,
                        weekday: self.weekday(self.recur_monthly_week_day.as_deref())?,
                    },
                    mode => return Err(self.invalid(format!("unknown recurMonthly_mode {mode}"))),
                };
                Ok(Recurrence::Monthly { every, on })
            }
            RecurEveryType::Years => {
                let on = match self.recur_yearly_mode {
                    0 => {
                        let month0 = self.month(self.recur_yearly_month.as_deref())?;
                        let day = self
                            .recur_yearly_day_num
                            .ok_or_else(|| self.invalid("yearly rule without recurYearly_dayNum"))?;
                        // Leap year 2000 gives the widest day range (February 29).
                        if day == 0 || day > days_in_month(2000, month0) {
                            return Err(self.invalid(format!(
                                "day {day} does not exist in {}",
                                date_math::MONTH_NAMES[month0 as usize]
                            )));
                        }
                        YearlyOn::Date { month0, day }
                    }
                    1 => YearlyOn::NthWeekday {
                        month0: self.month(self.recur_yearly_week_month.as_deref())?,
                        week: self.week_num(self.recur_yearly_week_num)?,
                        weekday: self.weekday(self.recur_yearly_week_day.as_deref())?,
                    },
                    mode => return Err(self.invalid(format!("unknown recurYearly_mode {mode}"))),
                };
                Ok(Recurrence::Yearly { every, on })
            }
        }
    }

    fn step(&self) -> Result<u32> {
        match self.recur_every_n {
            Some(n) if n > 0 => {
                u32::try_from(n).map_err(|_| self.invalid(format!("recurEveryN {n} too large")))
            }
            Some(n) => Err(self.invalid(format!("recurEveryN must be positive, got {n}"))),
            None => Err(self.invalid("recurring rule without recurEveryN")),
        }
    }

    fn week_num(&self, week: Option<u32>) -> Result<u32> {
        match week {
            Some(n) if (1..=MAX_WEEK_NUM).contains(&n) => Ok(n),
            Some(n) => Err(self.invalid(format!("week number {n} out of range 1..={MAX_WEEK_NUM}"))),
            None => Err(self.invalid("missing week number")),
        }
    }

    fn weekday(&self, tag: Option<&str>) -> Result<Weekday> {
        let tag = tag.ok_or_else(|| self.invalid("missing weekday"))?;
        date_math::weekday_from_tag(tag)
    }

    fn month(&self, name: Option<&str>) -> Result<u32> {
        let name = name.ok_or_else(|| self.invalid("missing month"))?;
        date_math::month_to_number(name)
    }

    fn invalid(&self, message: impl std::fmt::Display) -> CalendarError {
        CalendarError::InvalidRule(format!("rule '{}': {}", self.id, message))
    }
}
