//! Database connection settings for the users service.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use super::{ConfigError, load_from_env};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5433;
const DEFAULT_USERNAME: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_DATABASE: &str = "microsservico_users";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_CONNECTION_TIMEOUT_MS: u64 = 5000;

/// PostgreSQL settings read from `DB_*` variables.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DB")]
pub struct DatabaseSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Create the `users` table at startup when missing. Development only.
    #[ortho_config(default = false)]
    pub synchronize: bool,
    pub pool_max_size: Option<u32>,
    /// Idle connections to hold open. When set, startup connects eagerly.
    pub pool_min_idle: Option<u32>,
    /// How long a command waits for a pooled connection.
    pub pool_connection_timeout_ms: Option<u64>,
}

impl DatabaseSettings {
    /// Read the settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_from_env!(Self, "users-service")
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn pool_connection_timeout(&self) -> Duration {
        Duration::from_millis(
            self.pool_connection_timeout_ms
                .unwrap_or(DEFAULT_POOL_CONNECTION_TIMEOUT_MS),
        )
    }

    /// Connection URL with credentials percent-encoded.
    pub fn database_url(&self) -> Result<Url, ConfigError> {
        let invalid = |message: String| ConfigError::DatabaseUrl { message };
        let mut url = Url::parse("postgres://localhost").map_err(|err| invalid(err.to_string()))?;
        url.set_host(Some(self.host()))
            .map_err(|err| invalid(format!("host {}: {err}", self.host())))?;
        url.set_port(Some(self.port()))
            .map_err(|()| invalid(format!("port {}", self.port())))?;
        url.set_username(self.username())
            .map_err(|()| invalid("username rejected".to_owned()))?;
        url.set_password(Some(self.password()))
            .map_err(|()| invalid("password rejected".to_owned()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot carry a database name".to_owned()))?
            .clear()
            .push(self.database());
        Ok(url)
    }

    /// Pool configuration derived from these settings.
    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let url = self.database_url()?;
        Ok(PoolConfig::new(url.as_str())
            .with_max_size(self.pool_max_size())
            .with_min_idle(self.pool_min_idle)
            .with_connection_timeout(self.pool_connection_timeout()))
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host())
            .field("port", &self.port())
            .field("username", &self.username())
            .field("password", &"<redacted>")
            .field("database", &self.database())
            .field("synchronize", &self.synchronize)
            .field("pool_max_size", &self.pool_max_size())
            .field("pool_min_idle", &self.pool_min_idle)
            .field("pool_connection_timeout", &self.pool_connection_timeout())
            .finish()
    }
}
