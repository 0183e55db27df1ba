//! # Choreplanner Core Library
//!
//! Scheduling core for recurring household chores. All operations are
//! available through the `choreplanner` CLI, which is a thin layer over
//! this library.
//!
//! ## Architecture
//!
//! - **Interval**: recurrence rules and their fixed millisecond lengths
//! - **Schedule**: due-date engine (creation, re-anchoring, check-offs)
//! - **Notify**: daily selection of due-today and overdue chores, digest
//!   composition and the batch job that mails it
//! - **Storage**: SQLite chore/user storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`Chore`]: a recurring chore and its completion log
//! - [`ChoreService`]: create, edit, delete and check off over a store
//! - [`NotificationJob`]: daily digest run over a user/chore snapshot
//! - [`ChoreDb`]: SQLite persistence
//! - [`Config`]: application configuration management

pub mod chore;
pub mod error;
pub mod interval;
pub mod mailer;
pub mod notify;
pub mod ports;
pub mod schedule;
pub mod service;
pub mod storage;
pub mod user;

pub use chore::{Chore, ChoreDraft, ChoreEdit};
pub use error::{ConfigError, CoreError, DatabaseError, MailError, ScheduleError};
pub use interval::{interval_ms, RecurrenceRule, RecurrenceUnit};
pub use mailer::{OutboxMailer, OutboxMessage};
pub use notify::{
    select_notifications, Branding, Digest, JobReport, NotificationJob, NotificationSelection,
};
pub use ports::{ChoreFilter, ChoreStore, Mailer, UserStore};
pub use schedule::{check_off, compute_next_due, create_schedule, edit_schedule, CheckOff};
pub use service::ChoreService;
pub use storage::{ChoreDb, Config, MemoryStore};
pub use user::User;
