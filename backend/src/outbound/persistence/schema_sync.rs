//! Idempotent creation of the `users` table.
//!
//! Used when `DB_SYNCHRONIZE` is enabled for local development. Never enable
//! it against a production database; there is no migration history.

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::pool::DbPool;

/// DDL for the users table. Column names must match [`super::schema`].
pub const USERS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR NOT NULL UNIQUE,
    password VARCHAR NOT NULL,
    "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

/// Errors raised while synchronising the schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaSyncError {
    #[error("schema sync could not connect: {message}")]
    Connection { message: String },
    #[error("schema sync failed: {0}")]
    Statement(#[from] diesel::result::Error),
}

/// Create the users table if it does not exist.
///
/// # Errors
/// Returns [`SchemaSyncError`] when no connection is available or the DDL
/// fails.
pub async fn synchronize_schema(pool: &DbPool) -> Result<(), SchemaSyncError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|err| SchemaSyncError::Connection {
            message: err.to_string(),
        })?;
    conn.batch_execute(USERS_TABLE_DDL).await?;
    info!("users table synchronised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"createdAt\"")]
    #[case("\"updatedAt\"")]
    #[case("email VARCHAR NOT NULL UNIQUE")]
    #[case("IF NOT EXISTS")]
    fn ddl_declares_expected_columns(#[case] fragment: &str) {
        assert!(USERS_TABLE_DDL.contains(fragment), "missing {fragment}");
    }
}
