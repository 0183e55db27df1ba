//! Due-date engine.
//!
//! Every due date is `reference_time + interval`. The reference time is the
//! latest check-off, or the creation time for a chore never checked off.
//! Due dates move in exactly two situations: the recurrence rule actually
//! changes, or the chore is checked off (see [`completion`]).

pub mod completion;

use chrono::{DateTime, TimeDelta, Utc};

use crate::chore::Chore;
use crate::error::ScheduleError;
use crate::interval::RecurrenceRule;

pub use completion::{check_off, CheckOff};

/// `reference_time + interval_ms(recurrence)`, exactly.
///
/// # Errors
/// Returns [`ScheduleError::TimestampOutOfRange`] if the result is not a
/// representable timestamp.
pub fn compute_next_due(
    reference_time: DateTime<Utc>,
    recurrence: &RecurrenceRule,
) -> Result<DateTime<Utc>, ScheduleError> {
    let interval = TimeDelta::try_milliseconds(recurrence.interval_ms())
        .ok_or(ScheduleError::TimestampOutOfRange)?;
    reference_time
        .checked_add_signed(interval)
        .ok_or(ScheduleError::TimestampOutOfRange)
}

/// Time the schedule is anchored to: the last check-off, else creation.
pub fn reference_time(chore: &Chore) -> DateTime<Utc> {
    chore.last_completed_at().unwrap_or(chore.created_at)
}

/// First due date of a chore created at `created_at`.
pub fn create_schedule(
    created_at: DateTime<Utc>,
    recurrence: &RecurrenceRule,
) -> Result<DateTime<Utc>, ScheduleError> {
    compute_next_due(created_at, recurrence)
}

/// Due date the chore would have under `new_recurrence`.
///
/// An unchanged rule returns the current `next_due_at` as-is, so cosmetic
/// edits never shift the schedule.
pub fn reanchor_on_rule_change(
    chore: &Chore,
    new_recurrence: &RecurrenceRule,
) -> Result<DateTime<Utc>, ScheduleError> {
    if chore.recurrence == *new_recurrence {
        return Ok(chore.next_due_at);
    }
    compute_next_due(reference_time(chore), new_recurrence)
}

/// Store `new_recurrence` on the chore and re-anchor its due date.
///
/// Returns the resulting `next_due_at`. On error the chore is unchanged.
pub fn edit_schedule(
    chore: &mut Chore,
    new_recurrence: RecurrenceRule,
) -> Result<DateTime<Utc>, ScheduleError> {
    let next_due_at = reanchor_on_rule_change(chore, &new_recurrence)?;
    if next_due_at != chore.next_due_at {
        tracing::debug!(
            chore_id = %chore.id,
            from = %chore.recurrence,
            to = %new_recurrence,
            "re-anchored due date"
        );
    }
    chore.recurrence = new_recurrence;
    chore.next_due_at = next_due_at;
    Ok(next_due_at)
}
