//! Listener settings for the users service command transport.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::{ConfigError, load_from_env};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;

/// Where the users service accepts commands, from `USERS_SERVICE_*`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS_SERVICE")]
pub struct UsersServiceSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl UsersServiceSettings {
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

    /// Host and port for the command listener. Host names resolve at bind
    /// time.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host(), self.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> UsersServiceSettings {
        UsersServiceSettings::load_from_iter([OsString::from("users-service")])
            .expect("config should load")
    }

    #[rstest]
    fn binds_all_interfaces_on_3001_by_default() {
        let _guard = lock_env([
            ("USERS_SERVICE_HOST", None::<String>),
            ("USERS_SERVICE_PORT", None::<String>),
        ]);

        assert_eq!(load_from_empty_args().bind_addr(), ("0.0.0.0", 3001));
    }

    #[rstest]
    #[tokio::test]
    async fn host_names_resolve_when_binding() {
        let settings = {
            let _guard = lock_env([
                ("USERS_SERVICE_HOST", Some("localhost".to_owned())),
                ("USERS_SERVICE_PORT", Some("0".to_owned())),
            ]);
            load_from_empty_args()
        };

        assert_eq!(settings.bind_addr(), ("localhost", 0));
        let listener = tokio::net::TcpListener::bind(settings.bind_addr())
            .await
            .expect("localhost resolves");
        assert!(listener.local_addr().expect("local addr").ip().is_loopback());
    }
}
