//! Chore owners and their notification preference.

use serde::{Deserialize, Serialize};

/// A user who owns chores and may receive a daily digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Opted in to the daily digest
    #[serde(default = "default_true")]
    pub receive_notifications: bool,
    /// Owned chore ids, in creation order
    #[serde(default)]
    pub chores: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            receive_notifications: true,
            chores: Vec::new(),
        }
    }

    pub fn owns(&self, chore_id: &str) -> bool {
        self.chores.iter().any(|id| id == chore_id)
    }

    /// Remove `chore_id` from the owned list. Returns false if it was absent.
    pub fn release(&mut self, chore_id: &str) -> bool {
        match self.chores.iter().position(|id| id == chore_id) {
            Some(index) => {
                self.chores.remove(index);
                true
            }
            None => false,
        }
    }
}
