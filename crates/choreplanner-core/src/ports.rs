//! Collaborator interfaces.
//!
//! The scheduling code never touches storage or mail directly. Stores and
//! mailers implement these traits; [`crate::storage`] and [`crate::mailer`]
//! ship the concrete ones.

use crate::chore::Chore;
use crate::error::{MailError, Result};
use crate::notify::Digest;
use crate::user::User;

/// Query for [`ChoreStore::find`]. Empty filter matches every chore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoreFilter {
    /// Restrict to these ids
    pub ids: Option<Vec<String>>,
    /// Restrict to this exact name
    pub name: Option<String>,
}

impl ChoreFilter {
    pub fn ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            name: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            ids: None,
            name: Some(name.into()),
        }
    }

    pub fn matches(&self, chore: &Chore) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| *id == chore.id) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if chore.name != *name {
                return false;
            }
        }
        true
    }
}

/// Persistent chore storage.
///
/// Implementations must apply `save` atomically per chore: the completion
/// log and `next_due_at` of one chore are never observed half-written.
pub trait ChoreStore {
    fn find(&self, filter: &ChoreFilter) -> Result<Vec<Chore>>;

    /// # Errors
    /// [`crate::CoreError::NotFound`] if no chore has this id.
    fn find_by_id(&self, id: &str) -> Result<Chore>;

    /// Insert or replace.
    fn save(&self, chore: &Chore) -> Result<Chore>;

    /// # Errors
    /// [`crate::CoreError::NotFound`] if no chore has this id.
    fn delete(&self, id: &str) -> Result<()>;
}

/// Persistent user storage.
pub trait UserStore {
    /// # Errors
    /// [`crate::CoreError::NotFound`] if no user has this id.
    fn find_user(&self, id: &str) -> Result<User>;

    fn list_users(&self) -> Result<Vec<User>>;

    /// Insert or replace.
    fn save_user(&self, user: &User) -> Result<User>;
}

/// Outbound mail transport.
pub trait Mailer {
    fn send(&self, recipient: &str, subject: &str, digest: &Digest) -> Result<(), MailError>;
}

impl<M: Mailer + ?Sized> Mailer for &M {
    fn send(&self, recipient: &str, subject: &str, digest: &Digest) -> Result<(), MailError> {
        (**self).send(recipient, subject, digest)
    }
}
