//! User persistence adapters.
//!
//! The PostgreSQL adapter uses Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling:
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: all database errors are mapped to
//!   [`crate::domain::ports::UserPersistenceError`].
//!
//! # Example
//!
//! ```ignore
//! use usergate::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost:5433/microsservico_users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod in_memory_user_repository;
mod models;
mod pool;
mod schema;
mod schema_sync;

pub use diesel_user_repository::DieselUserRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use schema_sync::{SchemaSyncError, USERS_TABLE_DDL, synchronize_schema};
