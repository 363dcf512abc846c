//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match the DDL in [`super::schema_sync`]. The timestamp columns keep
//! their quoted camelCase names in the database.

diesel::table! {
    /// User accounts. `email` carries a unique constraint.
    users (id) {
        /// Serial primary key.
        id -> Int4,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
        #[sql_name = "updatedAt"]
        updated_at -> Timestamptz,
    }
}
