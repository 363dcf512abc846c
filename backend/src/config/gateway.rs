//! HTTP gateway settings, including where to reach the users service.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::{ConfigError, load_from_env};
use crate::outbound::transport::{DEFAULT_COMMAND_TIMEOUT, TcpClientConfig};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_USERS_SERVICE_HOST: &str = "localhost";
const DEFAULT_USERS_SERVICE_PORT: u16 = 3001;

/// Gateway settings read from `GATEWAY_*` variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GATEWAY")]
pub struct GatewaySettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub users_service_host: Option<String>,
    pub users_service_port: Option<u16>,
    /// How long a request waits for the users service to reply.
    pub command_timeout_ms: Option<u64>,
}

impl GatewaySettings {
    /// Read the settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_from_env!(Self, "gateway")
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Host and port for the HTTP listener. Host names resolve at bind time.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host(), self.port())
    }

    /// `host:port` of the users service. Host names are resolved on connect.
    pub fn users_service_address(&self) -> String {
        let host = self
            .users_service_host
            .as_deref()
            .unwrap_or(DEFAULT_USERS_SERVICE_HOST);
        let port = self.users_service_port.unwrap_or(DEFAULT_USERS_SERVICE_PORT);
        format!("{host}:{port}")
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout_ms
            .map_or(DEFAULT_COMMAND_TIMEOUT, Duration::from_millis)
    }

    /// Transport configuration for the users service client.
    pub fn client_config(&self) -> TcpClientConfig {
        TcpClientConfig::new(self.users_service_address())
            .with_command_timeout(self.command_timeout())
    }
}
