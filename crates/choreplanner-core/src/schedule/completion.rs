//! Check-offs.
//!
//! Checking off a chore appends to its completion log and re-anchors the
//! due date on the completion time. Both writes happen together or not at
//! all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compute_next_due;
use crate::chore::Chore;
use crate::error::ScheduleError;

/// Result of a check-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOff {
    /// Length of the completion log after the check-off
    pub completions: usize,
    pub completed_at: DateTime<Utc>,
    pub next_due_at: DateTime<Utc>,
}

/// Record a completion at `completed_at` and advance the due date.
///
/// Out-of-order timestamps are appended as given; ordering is the caller's
/// responsibility.
///
/// # Errors
/// Returns [`ScheduleError::TimestampOutOfRange`] if the new due date is
/// not representable. The chore is not modified in that case.
pub fn check_off(chore: &mut Chore, completed_at: DateTime<Utc>) -> Result<CheckOff, ScheduleError> {
    let next_due_at = compute_next_due(completed_at, &chore.recurrence)?;

    if let Some(last) = chore.last_completed_at() {
        if completed_at < last {
            tracing::warn!(
                chore_id = %chore.id,
                %last,
                %completed_at,
                "check-off is earlier than the previous one"
            );
        }
    }

    chore.completion_log.push(completed_at);
    chore.next_due_at = next_due_at;

    Ok(CheckOff {
        completions: chore.completion_log.len(),
        completed_at,
        next_due_at,
    })
}
