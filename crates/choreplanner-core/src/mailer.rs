//! File-based mail transport.
//!
//! [`OutboxMailer`] drops each message as a JSON file in a directory. A
//! relay or a person can pick them up from there.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::MailError;
use crate::notify::Digest;
use crate::ports::Mailer;

/// One message as written to the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub digest: Digest,
    /// Plain-text body
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
    sender: String,
}

impl OutboxMailer {
    /// The directory is created on first send.
    pub fn new(dir: impl Into<PathBuf>, sender: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            sender: sender.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, path: &Path, message: &OutboxMessage) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(message)?;
        std::fs::write(path, json)
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, recipient: &str, subject: &str, digest: &Digest) -> Result<(), MailError> {
        let message = OutboxMessage {
            sender: self.sender.clone(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            digest: digest.clone(),
            text: digest.render_text(),
        };
        let file_name = format!(
            "{}-{}.json",
            Utc::now().format("%Y%m%dT%H%M%S%3f"),
            uuid::Uuid::new_v4()
        );
        let path = self.dir.join(file_name);

        self.write(&path, &message)
            .map_err(|e| MailError::Transport {
                recipient: recipient.to_string(),
                message: format!("{}: {e}", path.display()),
            })?;
        tracing::debug!(recipient, path = %path.display(), "digest written to outbox");
        Ok(())
    }
}
