//! `config.toml` inspection and editing.

use clap::Subcommand;
use choreplanner_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key, e.g. "notifications.subject"
        key: String,
    },
    /// Change one setting and write the file
    Set {
        key: String,
        value: String,
    },
    /// Clear an optional setting such as "notifications.outbox_dir"
    Unset {
        key: String,
    },
    /// Print every setting as `key = value`
    List,
    /// Print where the config file lives
    Path,
    /// Overwrite the file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = Config::path()?;

    match action {
        ConfigAction::Get { key } => {
            let value = Config::load_from(&path)?
                .get(&key)
                .ok_or_else(|| format!("Unknown configuration key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => update(&path, &key, &value, false)?,
        ConfigAction::Unset { key } => update(&path, &key, "", true)?,
        ConfigAction::List => {
            for (key, value) in Config::load_from(&path)?.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Reset => {
            Config::default().save_to(&path)?;
            tracing::info!(path = %path.display(), "config reset to defaults");
        }
    }
    Ok(())
}

fn update(
    path: &std::path::Path,
    key: &str,
    value: &str,
    clearing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_from(path)?;
    config.set(key, value)?;
    let shown = config.get(key).unwrap_or_default();
    if clearing && shown != "null" {
        return Err(format!("{key} is required and cannot be unset").into());
    }
    config.save_to(path)?;
    println!("{key} = {shown}");
    Ok(())
}
