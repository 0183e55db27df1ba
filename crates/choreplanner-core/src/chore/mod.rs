//! Chore types.
//!
//! A chore is a recurring unit of work. Its `next_due_at` is always
//! `reference_time + interval`, where the reference time is the latest
//! check-off or, for a chore never checked off, its creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::interval::RecurrenceRule;
use crate::schedule;

/// A recurring chore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    /// Unique identifier
    pub id: String,
    /// Chore name
    pub name: String,
    /// How often the chore repeats
    pub recurrence: RecurrenceRule,
    /// Where the chore happens (optional)
    pub location: Option<String>,
    /// Expected time to finish, in seconds
    pub expected_duration_secs: u32,
    /// Optional priority (higher is more important)
    pub priority: Option<i32>,
    /// Check-off timestamps, oldest first
    #[serde(default)]
    pub completion_log: Vec<DateTime<Utc>>,
    /// When the chore is next due
    pub next_due_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a chore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreDraft {
    pub name: String,
    pub recurrence: RecurrenceRule,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub expected_duration_secs: u32,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl ChoreDraft {
    pub fn new(name: impl Into<String>, recurrence: RecurrenceRule) -> Self {
        Self {
            name: name.into(),
            recurrence,
            location: None,
            expected_duration_secs: 0,
            priority: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.expected_duration_secs = secs;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Partial update of a chore. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoreEdit {
    pub name: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
    /// `Some(None)` clears the location.
    pub location: Option<Option<String>>,
    pub expected_duration_secs: Option<u32>,
    /// `Some(None)` clears the priority.
    pub priority: Option<Option<i32>>,
}

impl ChoreEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.recurrence.is_none()
            && self.location.is_none()
            && self.expected_duration_secs.is_none()
            && self.priority.is_none()
    }
}

impl Chore {
    /// Create a chore from a draft, first due one interval after `created_at`.
    ///
    /// # Errors
    /// Returns [`ScheduleError::TimestampOutOfRange`] if the first due date
    /// is not representable.
    pub fn new(draft: ChoreDraft, created_at: DateTime<Utc>) -> Result<Self, ScheduleError> {
        let next_due_at = schedule::create_schedule(created_at, &draft.recurrence)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            recurrence: draft.recurrence,
            location: draft.location,
            expected_duration_secs: draft.expected_duration_secs,
            priority: draft.priority,
            completion_log: Vec::new(),
            next_due_at,
            created_at,
        })
    }

    /// Latest check-off, if any.
    pub fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        self.completion_log.last().copied()
    }

    /// Whether the due date has already passed at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at < now
    }

    /// Expected duration in (possibly fractional) minutes.
    pub fn expected_duration_minutes(&self) -> f64 {
        f64::from(self.expected_duration_secs) / 60.0
    }

    /// True if `draft` describes this chore's settings exactly.
    pub fn matches_draft(&self, draft: &ChoreDraft) -> bool {
        self.name == draft.name
            && self.recurrence == draft.recurrence
            && self.location == draft.location
            && self.expected_duration_secs == draft.expected_duration_secs
            && self.priority == draft.priority
    }

    /// Apply an edit. Only an actual recurrence change moves `next_due_at`.
    ///
    /// The new due date is computed before any field is written, so an
    /// error leaves the chore untouched.
    pub fn apply_edit(&mut self, edit: ChoreEdit) -> Result<(), ScheduleError> {
        if let Some(recurrence) = edit.recurrence {
            schedule::edit_schedule(self, recurrence)?;
        }
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(location) = edit.location {
            self.location = location;
        }
        if let Some(secs) = edit.expected_duration_secs {
            self.expected_duration_secs = secs;
        }
        if let Some(priority) = edit.priority {
            self.priority = priority;
        }
        Ok(())
    }
}
