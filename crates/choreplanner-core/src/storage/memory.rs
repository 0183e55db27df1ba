//! In-process store for tests and previews.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::chore::Chore;
use crate::error::{CoreError, Result};
use crate::ports::{ChoreFilter, ChoreStore, UserStore};
use crate::user::User;

/// Chores and users held in memory. Users keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chores: Mutex<HashMap<String, Chore>>,
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn chores(&self) -> MutexGuard<'_, HashMap<String, Chore>> {
        self.chores.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChoreStore for MemoryStore {
    fn find(&self, filter: &ChoreFilter) -> Result<Vec<Chore>> {
        Ok(self
            .chores()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &str) -> Result<Chore> {
        self.chores()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::chore_not_found(id))
    }

    fn save(&self, chore: &Chore) -> Result<Chore> {
        self.chores().insert(chore.id.clone(), chore.clone());
        Ok(chore.clone())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.chores()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::chore_not_found(id))
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, id: &str) -> Result<User> {
        self.users()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| CoreError::user_not_found(id))
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users().clone())
    }

    fn save_user(&self, user: &User) -> Result<User> {
        let mut users = self.users();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chore::ChoreDraft;
    use crate::interval::RecurrenceRule;
    use chrono::Utc;

    fn chore(name: &str) -> Chore {
        Chore::new(ChoreDraft::new(name, RecurrenceRule::weeks(1).unwrap()), Utc::now()).unwrap()
    }

    #[test]
    fn chore_crud() {
        let store = MemoryStore::new();
        let mut c = chore("Vacuum");
        store.save(&c).unwrap();
        assert_eq!(store.find_by_id(&c.id).unwrap(), c);

        c.name = "Vacuum stairs".into();
        store.save(&c).unwrap();
        assert_eq!(store.find(&ChoreFilter::default()).unwrap().len(), 1);
        assert_eq!(store.find(&ChoreFilter::name("Vacuum stairs")).unwrap().len(), 1);

        store.delete(&c.id).unwrap();
        assert!(store.find_by_id(&c.id).unwrap_err().is_not_found());
        assert!(store.delete(&c.id).unwrap_err().is_not_found());
    }

    #[test]
    fn users_keep_insertion_order() {
        let store = MemoryStore::new();
        let a = User::new("a@example.com");
        let mut b = User::new("b@example.com");
        store.save_user(&a).unwrap();
        store.save_user(&b).unwrap();

        b.receive_notifications = false;
        store.save_user(&b).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, a.id);
        assert!(!users[1].receive_notifications);
        assert!(store.find_user("missing").unwrap_err().is_not_found());
    }
}
