//! User CRUD use-cases executed by the users service.
//!
//! Each operation performs at most one repository call and classifies every
//! persistence failure before it leaves the domain.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Error, NewUser, User, UserId, UserPatch};

/// Users service implementing the command handlers' business rules.
#[derive(Clone)]
pub struct UsersService<R> {
    repo: Arc<R>,
}

impl<R> UsersService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> UsersService<R>
where
    R: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                warn!(%message, "user repository unavailable");
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Error::conflict(format!("email {email} is already registered")).with_details(
                    json!({
                        "field": "email",
                        "code": "duplicate_email",
                    }),
                )
            }
        }
    }

    fn user_not_found(id: UserId) -> Error {
        Error::not_found(format!("user {id} not found")).with_details(json!({ "id": id.get() }))
    }

    /// Insert a user and return it with its generated id and timestamps.
    pub async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        self.repo
            .insert(&user)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Every user, ordered by id. Unpaginated.
    pub async fn find_all_users(&self) -> Result<Vec<User>, Error> {
        self.repo.list().await.map_err(Self::map_persistence_error)
    }

    pub async fn find_one_user(&self, id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::user_not_found(id))
    }

    /// Apply a partial update. An empty patch only refreshes `updatedAt`.
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error> {
        self.repo
            .update(id, &patch)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::user_not_found(id))
    }

    pub async fn remove_user(&self, id: UserId) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Self::user_not_found(id))
        }
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
