//! Recurrence intervals.
//!
//! A chore repeats every `quantity` `unit`s. Months and years are fixed
//! multiples of a day (30 and 365) rather than calendar-aware lengths, so
//! every interval is a whole number of days and due dates never drift with
//! month length or leap years.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;
/// Milliseconds in one week.
pub const WEEK_MS: i64 = 7 * DAY_MS;
/// Milliseconds in one (flat, 30-day) month.
pub const MONTH_MS: i64 = 30 * DAY_MS;
/// Milliseconds in one (flat, 365-day) year.
pub const YEAR_MS: i64 = 365 * DAY_MS;

/// Unit of a recurrence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl RecurrenceUnit {
    /// Length of one unit in milliseconds.
    pub fn unit_ms(self) -> i64 {
        match self {
            RecurrenceUnit::Days => DAY_MS,
            RecurrenceUnit::Weeks => WEEK_MS,
            RecurrenceUnit::Months => MONTH_MS,
            RecurrenceUnit::Years => YEAR_MS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceUnit::Days => "days",
            RecurrenceUnit::Weeks => "weeks",
            RecurrenceUnit::Months => "months",
            RecurrenceUnit::Years => "years",
        }
    }
}

impl FromStr for RecurrenceUnit {
    type Err = ScheduleError;

    /// Accepts plural and singular forms, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "days" | "day" => Ok(RecurrenceUnit::Days),
            "weeks" | "week" => Ok(RecurrenceUnit::Weeks),
            "months" | "month" => Ok(RecurrenceUnit::Months),
            "years" | "year" => Ok(RecurrenceUnit::Years),
            _ => Err(ScheduleError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a raw `(quantity, unit)` pair into an interval in milliseconds.
///
/// # Errors
/// - [`ScheduleError::InvalidUnit`] if `unit` is not days, weeks, months or years
/// - [`ScheduleError::InvalidQuantity`] if `quantity <= 0`
/// - [`ScheduleError::IntervalOverflow`] if the interval does not fit in `i64`
pub fn interval_ms(quantity: i64, unit: &str) -> Result<i64, ScheduleError> {
    let unit = unit.parse::<RecurrenceUnit>()?;
    unit_interval_ms(quantity, unit)
}

fn unit_interval_ms(quantity: i64, unit: RecurrenceUnit) -> Result<i64, ScheduleError> {
    if quantity <= 0 {
        return Err(ScheduleError::InvalidQuantity(quantity));
    }
    quantity
        .checked_mul(unit.unit_ms())
        .ok_or_else(|| ScheduleError::IntervalOverflow {
            quantity,
            unit: unit.to_string(),
        })
}

/// How often a chore repeats.
///
/// Construction validates the rule, so a `RecurrenceRule` value always has
/// a positive quantity and an interval that fits in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrenceRule", into = "RawRecurrenceRule")]
pub struct RecurrenceRule {
    quantity: u32,
    unit: RecurrenceUnit,
}

impl RecurrenceRule {
    /// # Errors
    /// Returns [`ScheduleError::InvalidQuantity`] for `quantity <= 0` and
    /// [`ScheduleError::IntervalOverflow`] for intervals beyond `i64` milliseconds.
    pub fn new(quantity: i64, unit: RecurrenceUnit) -> Result<Self, ScheduleError> {
        unit_interval_ms(quantity, unit)?;
        let quantity = u32::try_from(quantity).map_err(|_| ScheduleError::IntervalOverflow {
            quantity,
            unit: unit.to_string(),
        })?;
        Ok(Self { quantity, unit })
    }

    /// Parse a rule from its raw parts, e.g. `(3, "weeks")`.
    pub fn parse(quantity: i64, unit: &str) -> Result<Self, ScheduleError> {
        Self::new(quantity, unit.parse()?)
    }

    pub fn days(quantity: i64) -> Result<Self, ScheduleError> {
        Self::new(quantity, RecurrenceUnit::Days)
    }

    pub fn weeks(quantity: i64) -> Result<Self, ScheduleError> {
        Self::new(quantity, RecurrenceUnit::Weeks)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit(&self) -> RecurrenceUnit {
        self.unit
    }

    /// Interval length in milliseconds.
    pub fn interval_ms(&self) -> i64 {
        // Overflow was ruled out in `new`.
        i64::from(self.quantity) * self.unit.unit_ms()
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} {}", self.quantity, self.unit)
    }
}

/// Unvalidated wire form of a [`RecurrenceRule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRecurrenceRule {
    quantity: i64,
    unit: String,
}

impl TryFrom<RawRecurrenceRule> for RecurrenceRule {
    type Error = ScheduleError;

    fn try_from(raw: RawRecurrenceRule) -> Result<Self, Self::Error> {
        RecurrenceRule::parse(raw.quantity, &raw.unit)
    }
}

impl From<RecurrenceRule> for RawRecurrenceRule {
    fn from(rule: RecurrenceRule) -> Self {
        Self {
            quantity: i64::from(rule.quantity),
            unit: rule.unit.as_str().to_string(),
        }
    }
}
