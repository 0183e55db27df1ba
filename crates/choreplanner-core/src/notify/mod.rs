//! Daily notifications: which chores to mention, how the email reads, and
//! the batch job that sends it.

pub mod digest;
pub mod job;
pub mod selector;

pub use digest::{Branding, Digest, DigestAction, DigestRow, DigestTable, DEFAULT_SUBJECT};
pub use job::{DeliveryStatus, JobReport, NotificationJob, UserOutcome};
pub use selector::{
    day_bucket, is_due_today, is_overdue, select_notifications, DueItem, NotificationSelection,
    OverdueItem,
};
