//! TOML-based application configuration.
//!
//! Stores:
//! - Digest mail settings (sender, subject, branding, outbox location)
//! - Log verbosity
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, data_dir_path};
use crate::error::ConfigError;
use crate::notify::{Branding, DEFAULT_SUBJECT};

/// Digest mail configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_product_link")]
    pub product_link: String,
    /// Where the outbox mailer drops messages. Defaults to `<data dir>/outbox`.
    #[serde(default)]
    pub outbox_dir: Option<String>,
}

/// Logging configuration. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_sender() -> String {
    "noreply@choreplanner.local".into()
}
fn default_subject() -> String {
    DEFAULT_SUBJECT.into()
}
fn default_product_name() -> String {
    "Choreplanner".into()
}
fn default_product_link() -> String {
    "http://localhost:3000".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            subject: default_subject(),
            product_name: default_product_name(),
            product_link: default_product_link(),
            outbox_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
        nullable: bool,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    _ if nullable && value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data dir>/config.toml`
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a leaf value by dot-separated key. The change is in memory only;
    /// call [`Config::save`] to persist it.
    ///
    /// An empty value clears an optional setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let defaults = serde_json::to_value(Self::default()).map_err(|e| invalid(e.to_string()))?;
        let nullable = matches!(
            Self::get_json_value_by_path(&defaults, key),
            Some(serde_json::Value::Null)
        );
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value, nullable)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Every leaf setting as `(dot.key, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            flatten("", &json, &mut out);
        }
        out
    }

    /// Product name and link for digest composition.
    pub fn branding(&self) -> Branding {
        Branding {
            product_name: self.notifications.product_name.clone(),
            product_link: self.notifications.product_link.clone(),
        }
    }

    /// Outbox directory, falling back to `<data dir>/outbox`.
    pub fn outbox_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.notifications.outbox_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(data_dir()?.join("outbox")),
        }
    }

    /// Read an existing `config.toml` without creating the data directory
    /// or a default file. `None` if the file is missing or does not parse.
    pub fn peek() -> Option<Self> {
        let content = std::fs::read_to_string(data_dir_path().join("config.toml")).ok()?;
        toml::from_str(&content).ok()
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
        }
        serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[notifications]\nsender = \"chores@home.test\"\n").unwrap();
        assert_eq!(parsed.notifications.sender, "chores@home.test");
        assert_eq!(parsed.notifications.subject, DEFAULT_SUBJECT);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("logging.level").as_deref(), Some("info"));
        assert_eq!(
            cfg.get("notifications.product_name").as_deref(),
            Some("Choreplanner")
        );
        assert_eq!(cfg.get("notifications.outbox_dir").as_deref(), Some("null"));
        assert!(cfg.get("notifications.missing_key").is_none());
        assert!(cfg.get("notifications").is_none());
    }

    #[test]
    fn set_updates_nested_string() {
        let mut cfg = Config::default();
        cfg.set("notifications.subject", "Chores today").unwrap();
        assert_eq!(cfg.notifications.subject, "Chores today");
    }

    #[test]
    fn set_fills_and_clears_optional_value() {
        let mut cfg = Config::default();
        cfg.set("notifications.outbox_dir", "/tmp/outbox").unwrap();
        assert_eq!(cfg.notifications.outbox_dir.as_deref(), Some("/tmp/outbox"));
        assert_eq!(cfg.outbox_dir().unwrap(), PathBuf::from("/tmp/outbox"));

        cfg.set("notifications.outbox_dir", "").unwrap();
        assert_eq!(cfg.notifications.outbox_dir, None);
        assert_eq!(cfg.get("notifications.outbox_dir").as_deref(), Some("null"));
    }

    #[test]
    fn cleared_outbox_dir_stays_cleared_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("notifications.outbox_dir", "/srv/outbox").unwrap();
        cfg.save_to(&path).unwrap();

        let mut reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.notifications.outbox_dir.as_deref(), Some("/srv/outbox"));
        reloaded.set("notifications.outbox_dir", "").unwrap();
        reloaded.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap().notifications.outbox_dir, None);
    }

    #[test]
    fn empty_value_on_required_key_is_kept_as_text() {
        let mut cfg = Config::default();
        cfg.set("notifications.subject", "").unwrap();
        assert_eq!(cfg.notifications.subject, "");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("notifications.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "value"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("logging", "debug"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::json!({ "flags": { "enabled": true, "count": 3 } });
        let result = Config::set_json_value_by_path(&mut json, "flags.enabled", "not_a_bool", false);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        let result = Config::set_json_value_by_path(&mut json, "flags.count", "many", false);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        Config::set_json_value_by_path(&mut json, "flags.count", "7", false).unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "flags.count").unwrap(),
            &serde_json::Value::Number(7.into())
        );
    }

    #[test]
    fn entries_lists_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        for expected in [
            "notifications.sender",
            "notifications.subject",
            "notifications.product_name",
            "notifications.product_link",
            "notifications.outbox_dir",
            "logging.level",
        ] {
            assert!(keys.iter().any(|k| k == expected), "missing {expected}");
        }
    }

    #[test]
    fn branding_comes_from_notifications() {
        let mut cfg = Config::default();
        cfg.notifications.product_name = "HomeBase".into();
        let branding = cfg.branding();
        assert_eq!(branding.product_name, "HomeBase");
        assert_eq!(branding.product_link, "http://localhost:3000");
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("logging.level", "debug").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().logging.level, "debug");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "notifications = 42").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
