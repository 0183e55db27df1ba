//! Chore management commands for CLI.

use clap::Subcommand;
use choreplanner_core::{ChoreDb, ChoreDraft, ChoreEdit, ChoreService, RecurrenceRule};
use serde::Serialize;

use super::parse_at;

#[derive(Subcommand)]
pub enum ChoreAction {
    /// Create a new chore
    Add {
        /// Chore name
        name: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Repeat every N units
        #[arg(long)]
        every: i64,
        /// Recurrence unit: days, weeks, months or years
        #[arg(long, default_value = "days")]
        unit: String,
        /// Where the chore happens
        #[arg(long)]
        location: Option<String>,
        /// Expected duration in minutes
        #[arg(long, default_value = "0")]
        duration_mins: u32,
        /// Priority
        #[arg(long)]
        priority: Option<i32>,
        /// Creation time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List a user's chores, soonest due first
    List {
        /// Owning user ID
        #[arg(long)]
        user: String,
    },
    /// Get chore details
    Get {
        /// Chore ID
        id: String,
    },
    /// Update a chore
    Edit {
        /// Chore ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New recurrence quantity (requires --unit)
        #[arg(long, requires = "unit")]
        every: Option<i64>,
        /// New recurrence unit (requires --every)
        #[arg(long, requires = "every")]
        unit: Option<String>,
        /// New location
        #[arg(long, conflicts_with = "clear_location")]
        location: Option<String>,
        /// Remove the location
        #[arg(long)]
        clear_location: bool,
        /// New expected duration in minutes
        #[arg(long)]
        duration_mins: Option<u32>,
        /// New priority
        #[arg(long)]
        priority: Option<i32>,
    },
    /// Mark a chore as done
    Check {
        /// Chore ID
        id: String,
        /// Completion time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Delete a chore
    Delete {
        /// Chore ID
        id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
    },
}

/// Chore as listed, with the overdue flag evaluated now.
#[derive(Serialize)]
struct ListedChore {
    #[serde(flatten)]
    chore: choreplanner_core::Chore,
    overdue: bool,
}

pub fn run(action: ChoreAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = ChoreService::new(ChoreDb::open()?);

    match action {
        ChoreAction::Add {
            name,
            user,
            every,
            unit,
            location,
            duration_mins,
            priority,
            at,
        } => {
            let mut draft = ChoreDraft::new(name, RecurrenceRule::parse(every, &unit)?)
                .with_duration_secs(duration_mins.saturating_mul(60));
            if let Some(location) = location {
                draft = draft.with_location(location);
            }
            if let Some(priority) = priority {
                draft = draft.with_priority(priority);
            }
            let chore = service.create_chore(&user, draft, parse_at(at.as_deref())?)?;
            eprintln!("Chore created: {}", chore.id);
            println!("{}", serde_json::to_string_pretty(&chore)?);
        }
        ChoreAction::List { user } => {
            let now = chrono::Utc::now();
            let listed: Vec<_> = service
                .list_chores(&user)?
                .into_iter()
                .map(|chore| ListedChore {
                    overdue: chore.is_overdue(now),
                    chore,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        ChoreAction::Get { id } => {
            let chore = service.get_chore(&id)?;
            println!("{}", serde_json::to_string_pretty(&chore)?);
        }
        ChoreAction::Edit {
            id,
            name,
            every,
            unit,
            location,
            clear_location,
            duration_mins,
            priority,
        } => {
            let recurrence = match (every, unit) {
                (Some(every), Some(unit)) => Some(RecurrenceRule::parse(every, &unit)?),
                _ => None,
            };
            let location = if clear_location {
                Some(None)
            } else {
                location.map(Some)
            };
            let edit = ChoreEdit {
                name,
                recurrence,
                location,
                expected_duration_secs: duration_mins.map(|m| m.saturating_mul(60)),
                priority: priority.map(Some),
            };
            let chore = service.edit_chore(&id, edit)?;
            println!("{}", serde_json::to_string_pretty(&chore)?);
        }
        ChoreAction::Check { id, at } => {
            let result = service.check_off(&id, parse_at(at.as_deref())?)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ChoreAction::Delete { id, user } => {
            service.delete_chore(&user, &id)?;
            println!("Chore deleted: {id}");
        }
    }

    Ok(())
}
