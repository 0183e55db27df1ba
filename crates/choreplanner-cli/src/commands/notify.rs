//! Daily digest commands for CLI.

use clap::Subcommand;
use choreplanner_core::{ChoreDb, ChoreService, Config, Digest, NotificationJob, OutboxMailer};

use super::parse_at;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show what a user's digest would list
    Preview {
        /// User ID
        #[arg(long)]
        user: String,
        /// Evaluation time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
        /// Print the rendered email text instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Send the daily digest to every opted-in user
    Run {
        /// Evaluation time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
        /// Compose digests without writing them to the outbox
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let service = ChoreService::new(ChoreDb::open()?);

    match action {
        NotifyAction::Preview { user, at, text } => {
            let selection = service.preview(&user, parse_at(at.as_deref())?)?;
            if text {
                print!("{}", Digest::compose(&selection, &config.branding()));
            } else {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            }
        }
        NotifyAction::Run { at, dry_run } => {
            let now = parse_at(at.as_deref())?;
            let job = NotificationJob::new(config.branding())
                .with_subject(&config.notifications.subject);
            let job = if dry_run { job.dry_run() } else { job };
            let mailer = OutboxMailer::new(config.outbox_dir()?, &config.notifications.sender);
            tracing::debug!(outbox = %mailer.dir().display(), %now, dry_run, "running digest job");

            let report = service.run_notifications(&job, now, &mailer)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
