//! Environment-sourced settings for both services, loaded via OrthoConfig.
//!
//! One struct per concern, each with its own variable prefix. Unset values
//! fall back to the defaults below.
//!
//! | Variable | Default |
//! |---|---|
//! | `DB_HOST` / `DB_PORT` | `localhost` / `5433` |
//! | `DB_USERNAME` / `DB_PASSWORD` | `postgres` / `postgres` |
//! | `DB_DATABASE` | `microsservico_users` |
//! | `DB_SYNCHRONIZE` | `false` |
//! | `DB_POOL_MAX_SIZE` | `10` |
//! | `DB_POOL_MIN_IDLE` | unset (connect lazily) |
//! | `DB_POOL_CONNECTION_TIMEOUT_MS` | `5000` |
//! | `USERS_SERVICE_HOST` / `USERS_SERVICE_PORT` | `0.0.0.0` / `3001` |
//! | `GATEWAY_HOST` / `GATEWAY_PORT` | `0.0.0.0` / `3000` |
//! | `GATEWAY_USERS_SERVICE_HOST` / `GATEWAY_USERS_SERVICE_PORT` | `localhost` / `3001` |
//! | `GATEWAY_COMMAND_TIMEOUT_MS` | `5000` |

/// Errors raised while turning settings into runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The settings could not be read from the environment.
    #[error("failed to load {name} settings: {message}")]
    Load { name: &'static str, message: String },
    /// The database settings do not form a valid connection URL.
    #[error("invalid database URL: {message}")]
    DatabaseUrl { message: String },
}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

/// Load settings from the environment only, ignoring process arguments.
macro_rules! load_from_env {
    ($settings:ty, $name:literal) => {
        <$settings>::load_from_iter([std::ffi::OsString::from($name)]).map_err(|err| {
            $crate::config::ConfigError::Load {
                name: $name,
                message: err.to_string(),
            }
        })
    };
}

pub(crate) use load_from_env;

mod database;
mod gateway;
mod users_service;

pub use database::DatabaseSettings;
pub use gateway::GatewaySettings;
pub use users_service::UsersServiceSettings;
