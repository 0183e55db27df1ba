//! Due-today and overdue selection.
//!
//! Both checks compare UTC day buckets, never raw instants:
//!
//! - due today: `(bucket(now) - bucket(next_due_at)) mod interval == 0`
//! - overdue: `bucket(next_due_at) < bucket(now)`
//!
//! The checks are independent. A chore whose due date lies an exact number
//! of intervals in the past is both overdue and due today, and shows up in
//! both lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chore::Chore;
use crate::interval::DAY_MS;

/// Start of the UTC day containing `t`, in epoch milliseconds.
pub fn day_bucket(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis().div_euclid(DAY_MS) * DAY_MS
}

/// Whether the chore's recurrence lands on today's bucket.
///
/// Uses a Euclidean remainder, so due dates an exact number of intervals
/// ahead of today match as well as those behind it.
pub fn is_due_today(chore: &Chore, now: DateTime<Utc>) -> bool {
    let offset = day_bucket(now) - day_bucket(chore.next_due_at);
    offset.rem_euclid(chore.recurrence.interval_ms()) == 0
}

/// Whether the chore was due on an earlier UTC day than `now`.
pub fn is_overdue(chore: &Chore, now: DateTime<Utc>) -> bool {
    day_bucket(chore.next_due_at) < day_bucket(now)
}

/// One line of the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueItem {
    pub chore_id: String,
    pub name: String,
    pub location: Option<String>,
    pub expected_duration_minutes: f64,
}

impl From<&Chore> for DueItem {
    fn from(chore: &Chore) -> Self {
        Self {
            chore_id: chore.id.clone(),
            name: chore.name.clone(),
            location: chore.location.clone(),
            expected_duration_minutes: chore.expected_duration_minutes(),
        }
    }
}

/// An overdue chore, with the date it fell due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueItem {
    #[serde(flatten)]
    pub item: DueItem,
    /// `next_due_at` as `YYYY-MM-DD`
    pub due_since: String,
    pub next_due_at: DateTime<Utc>,
}

impl From<&Chore> for OverdueItem {
    fn from(chore: &Chore) -> Self {
        Self {
            item: DueItem::from(chore),
            due_since: chore.next_due_at.format("%Y-%m-%d").to_string(),
            next_due_at: chore.next_due_at,
        }
    }
}

/// Chores to mention in one user's digest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSelection {
    pub due_today: Vec<DueItem>,
    pub overdue: Vec<OverdueItem>,
}

impl NotificationSelection {
    pub fn is_empty(&self) -> bool {
        self.due_today.is_empty() && self.overdue.is_empty()
    }
}

/// Run both checks over every chore, keeping input order.
pub fn select_notifications<'a, I>(now: DateTime<Utc>, chores: I) -> NotificationSelection
where
    I: IntoIterator<Item = &'a Chore>,
{
    let mut selection = NotificationSelection::default();
    for chore in chores {
        if is_due_today(chore, now) {
            selection.due_today.push(DueItem::from(chore));
        }
        if is_overdue(chore, now) {
            selection.overdue.push(OverdueItem::from(chore));
        }
    }
    selection
}
