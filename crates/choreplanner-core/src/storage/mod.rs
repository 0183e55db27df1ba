mod config;
pub mod chore_db;
pub mod memory;
pub mod migrations;

pub use chore_db::ChoreDb;
pub use config::{Config, LoggingConfig, NotificationsConfig};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Location of the data directory, without touching the filesystem.
///
/// `CHOREPLANNER_DATA_DIR` wins when set. Otherwise
/// `~/.config/choreplanner[-dev]/`, with the `-dev` suffix when
/// `CHOREPLANNER_ENV=dev`.
pub fn data_dir_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("CHOREPLANNER_DATA_DIR") {
        return PathBuf::from(explicit);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CHOREPLANNER_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("choreplanner-dev")
    } else {
        base_dir.join("choreplanner")
    }
}

/// Returns the data directory, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
