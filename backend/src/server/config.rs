//! HTTP server configuration object and helpers.

use crate::inbound::http::state::HttpState;

/// Builder-style configuration for creating the gateway HTTP server.
pub struct ServerConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) http_state: HttpState,
    pub(crate) swagger_ui: bool,
}

impl ServerConfig {
    /// Construct a server configuration around the handler state.
    ///
    /// Swagger UI is served unless disabled.
    #[must_use]
    ///
    /// `host` may be an IP literal or a name; names are resolved when binding.
    pub fn new(http_state: HttpState, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            http_state,
            swagger_ui: true,
        }
    }

    /// Toggle the Swagger UI at `/api-doc`.
    #[must_use]
    pub fn with_swagger_ui(mut self, enabled: bool) -> Self {
        self.swagger_ui = enabled;
        self
    }

    /// Return the host and port the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}
