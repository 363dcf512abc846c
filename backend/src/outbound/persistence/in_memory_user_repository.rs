//! In-memory `UserRepository` with the same id, ordering, and uniqueness
//! rules as the PostgreSQL table.
//!
//! Backs tests and local runs of the users service without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, User, UserId, UserPatch};

#[derive(Debug, Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<UserId, User>,
}

impl Table {
    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.rows
            .values()
            .any(|user| user.email() == email && Some(user.id()) != except)
    }
}

/// Mutex-guarded user table. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut table = self.table.lock().await;
        if table.email_taken(user.email(), None) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        let next = table
            .next_id
            .checked_add(1)
            .ok_or_else(|| UserPersistenceError::query("user id sequence exhausted"))?;
        let id = UserId::new(next).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        table.next_id = next;

        let now = Utc::now();
        let stored = User::new(id, user.clone(), now, now);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut table = self.table.lock().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = patch.email.as_ref() {
            if table.email_taken(email, Some(id)) {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }
        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.apply(patch.clone(), Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut table = self.table.lock().await;
        Ok(table.rows.remove(&id).is_some())
    }
}
