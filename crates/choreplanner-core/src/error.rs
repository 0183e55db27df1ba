//! Core error types for choreplanner-core.
//!
//! This module defines the error hierarchy using thiserror. Scheduling
//! errors are kept separate from storage and transport errors so the pure
//! scheduling functions never have to mention a database.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for choreplanner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Recurrence or due-date arithmetic errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Mail transport errors
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// A referenced chore or user does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A chore with identical settings already exists
    #[error("Chore '{name}' already exists. Edit the existing chore instead.")]
    Duplicate { name: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn chore_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: "Chore",
            id: id.into(),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: "User",
            id: id.into(),
        }
    }

    /// True for `NotFound` of any kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

/// Errors from the recurrence and due-date arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Unrecognized recurrence unit
    #[error("Invalid recurrence unit '{0}': expected days, weeks, months or years")]
    InvalidUnit(String),

    /// Non-positive recurrence quantity
    #[error("Invalid recurrence quantity {0}: must be greater than zero")]
    InvalidQuantity(i64),

    /// Interval does not fit in a millisecond count
    #[error("Recurrence interval of {quantity} {unit} is too large")]
    IntervalOverflow { quantity: i64, unit: String },

    /// Due date falls outside the representable timestamp range
    #[error("Computed due date is out of range")]
    TimestampOutOfRange,
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded into a domain value
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: &'static str, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Mail transport errors.
#[derive(Error, Debug)]
pub enum MailError {
    /// Message could not be handed to the transport
    #[error("Failed to deliver mail to {recipient}: {message}")]
    Transport { recipient: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
