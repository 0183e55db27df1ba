//! User management commands for CLI.

use clap::{Subcommand, ValueEnum};
use choreplanner_core::{ChoreDb, ChoreService};

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        /// Email address for the daily digest
        email: String,
        /// Opt out of the daily digest
        #[arg(long)]
        no_notifications: bool,
    },
    /// List users
    List,
    /// Turn the daily digest on or off
    Notifications {
        /// User ID
        id: String,
        state: Toggle,
    },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = ChoreService::new(ChoreDb::open()?);

    match action {
        UserAction::Add {
            email,
            no_notifications,
        } => {
            let user = service.add_user(&email, !no_notifications)?;
            eprintln!("User created: {}", user.id);
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::List => {
            println!("{}", serde_json::to_string_pretty(&service.list_users()?)?);
        }
        UserAction::Notifications { id, state } => {
            let user = service.set_notifications(&id, matches!(state, Toggle::On))?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }

    Ok(())
}
