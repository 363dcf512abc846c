//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Inserts and updates use `RETURNING` so every port method is a single
//! statement. Email uniqueness is left to the table's unique constraint.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, User, UserId, UserPatch, UserValidationError};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to user persistence errors.
///
/// `email` is the address the statement tried to write; a unique violation is
/// only reported as a duplicate email when one was written.
fn map_diesel_error(error: diesel::result::Error, email: Option<&Email>) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match (error, email) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), Some(email)) => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        (DieselError::NotFound, _) => UserPersistenceError::query("record not found"),
        (DieselError::QueryBuilderError(_), _) => {
            UserPersistenceError::query("database query error")
        }
        (DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _), _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

/// Convert a database row to a domain user, re-validating stored values.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        password,
        created_at,
        updated_at,
    } = row;
    let invalid = |err: UserValidationError| {
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };
    let user_id = UserId::new(id).map_err(invalid)?;
    let details = NewUser::try_from_strings(name, email, password).map_err(invalid)?;
    Ok(User::new(user_id, details, created_at, updated_at))
}

fn changeset_for(patch: &UserPatch) -> UserChangeset<'_> {
    UserChangeset {
        name: patch.name.as_ref().map(AsRef::as_ref),
        email: patch.email.as_ref().map(AsRef::as_ref),
        password: patch.password.as_ref().map(|password| password.expose()),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password: user.password().expose(),
        };

        let row = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.email())))?;

        row_to_user(row)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set((changeset_for(patch), users::updated_at.eq(Utc::now())))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, patch.email.as_ref()))?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(String::from("constraint failed")))
    }

    fn ana_email() -> Email {
        Email::new("ana@x.com").expect("valid email")
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_with_email_is_duplicate() {
        let email = ana_email();
        let repo_err = map_diesel_error(
            database_error(DatabaseErrorKind::UniqueViolation),
            Some(&email),
        );
        assert_eq!(repo_err, UserPersistenceError::duplicate_email("ana@x.com"));
    }

    #[rstest]
    fn unique_violation_without_email_is_query_error() {
        let repo_err = map_diesel_error(database_error(DatabaseErrorKind::UniqueViolation), None);
        assert!(matches!(repo_err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let repo_err = map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection), None);
        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound, None);
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_to_user_converts_valid_row() {
        let now = Utc::now();
        let row = UserRow {
            id: 3,
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            password: "secret1".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let user = row_to_user(row).expect("valid row");
        assert_eq!(user.id().get(), 3);
        assert_eq!(user.email(), &ana_email());
    }

    #[rstest]
    fn row_to_user_rejects_corrupt_row() {
        let now = Utc::now();
        let row = UserRow {
            id: 0,
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            password: "secret1".to_owned(),
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(
            row_to_user(row),
            Err(UserPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn empty_patch_yields_empty_changeset() {
        let patch = UserPatch::default();
        let changeset = changeset_for(&patch);
        assert!(changeset.name.is_none());
        assert!(changeset.email.is_none());
        assert!(changeset.password.is_none());
    }
}
