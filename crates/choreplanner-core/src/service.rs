//! Chore and user management over a store.
//!
//! The service loads, mutates with the scheduling functions, and saves. It
//! also keeps each user's owned-chore list in step with creates and deletes.

use chrono::{DateTime, Utc};

use crate::chore::{Chore, ChoreDraft, ChoreEdit};
use crate::error::{CoreError, Result};
use crate::notify::{JobReport, NotificationJob, NotificationSelection};
use crate::ports::{ChoreFilter, ChoreStore, Mailer, UserStore};
use crate::schedule::{self, CheckOff};
use crate::user::User;

pub struct ChoreService<S> {
    store: S,
}

impl<S: ChoreStore + UserStore> ChoreService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // === Users ===

    pub fn add_user(&self, email: &str, receive_notifications: bool) -> Result<User> {
        let mut user = User::new(email);
        user.receive_notifications = receive_notifications;
        self.store.save_user(&user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users()
    }

    pub fn set_notifications(&self, user_id: &str, enabled: bool) -> Result<User> {
        let mut user = self.store.find_user(user_id)?;
        user.receive_notifications = enabled;
        self.store.save_user(&user)
    }

    // === Chores ===

    /// Create a chore for `user_id`, first due one interval after `now`.
    ///
    /// # Errors
    /// [`CoreError::Duplicate`] if any stored chore already has exactly
    /// these settings; [`CoreError::NotFound`] if the user does not exist.
    pub fn create_chore(&self, user_id: &str, draft: ChoreDraft, now: DateTime<Utc>) -> Result<Chore> {
        let mut user = self.store.find_user(user_id)?;

        let same_name = self.store.find(&ChoreFilter::name(draft.name.clone()))?;
        if same_name.iter().any(|c| c.matches_draft(&draft)) {
            return Err(CoreError::Duplicate { name: draft.name });
        }

        let chore = self.store.save(&Chore::new(draft, now)?)?;
        user.chores.push(chore.id.clone());
        if let Err(e) = self.store.save_user(&user) {
            // Drop the chore again so no unowned row is left behind.
            if let Err(undo) = self.store.delete(&chore.id) {
                tracing::warn!(chore_id = %chore.id, error = %undo, "failed to remove chore after owner update failed");
            }
            return Err(e);
        }

        tracing::info!(chore_id = %chore.id, user_id, next_due_at = %chore.next_due_at, "chore created");
        Ok(chore)
    }

    /// The user's chores, soonest due first.
    pub fn list_chores(&self, user_id: &str) -> Result<Vec<Chore>> {
        let user = self.store.find_user(user_id)?;
        let mut chores = self.store.find(&ChoreFilter::ids(user.chores))?;
        chores.sort_by_key(|c| c.next_due_at);
        Ok(chores)
    }

    pub fn get_chore(&self, id: &str) -> Result<Chore> {
        self.store.find_by_id(id)
    }

    pub fn edit_chore(&self, id: &str, edit: ChoreEdit) -> Result<Chore> {
        let mut chore = self.store.find_by_id(id)?;
        if edit.is_empty() {
            return Ok(chore);
        }
        chore.apply_edit(edit)?;
        self.store.save(&chore)
    }

    /// Delete a chore owned by `user_id`.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if the chore is not in the user's list.
    pub fn delete_chore(&self, user_id: &str, id: &str) -> Result<()> {
        let mut user = self.store.find_user(user_id)?;
        if !user.release(id) {
            return Err(CoreError::chore_not_found(id));
        }
        match self.store.delete(id) {
            Ok(()) => {}
            // Dangling id in the user's list; dropping it is still correct.
            Err(e) if e.is_not_found() => {
                tracing::warn!(chore_id = id, user_id, "owned chore was already gone");
            }
            Err(e) => return Err(e),
        }
        self.store.save_user(&user)?;
        Ok(())
    }

    pub fn check_off(&self, id: &str, now: DateTime<Utc>) -> Result<CheckOff> {
        let mut chore = self.store.find_by_id(id)?;
        let result = schedule::check_off(&mut chore, now)?;
        self.store.save(&chore)?;
        Ok(result)
    }

    // === Notifications ===

    /// What the user's digest would list at `now`.
    pub fn preview(&self, user_id: &str, now: DateTime<Utc>) -> Result<NotificationSelection> {
        let user = self.store.find_user(user_id)?;
        let chores = self.store.find(&ChoreFilter::ids(user.chores.iter().cloned()))?;
        // Keep the user's ownership order.
        let ordered = user
            .chores
            .iter()
            .filter_map(|id| chores.iter().find(|c| c.id == *id));
        Ok(crate::notify::select_notifications(now, ordered))
    }

    /// Run the digest job over every stored user and chore.
    pub fn run_notifications<M: Mailer>(
        &self,
        job: &NotificationJob,
        now: DateTime<Utc>,
        mailer: &M,
    ) -> Result<JobReport> {
        let users = self.store.list_users()?;
        let chores = self.store.find(&ChoreFilter::default())?;
        Ok(job.run(now, &users, &chores, mailer))
    }
}
