//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the users client and remain testable without I/O.

use crate::domain::UsersClient;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: UsersClient,
}

impl HttpState {
    /// Construct state from the gateway's users client.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use usergate::domain::UsersClient;
    /// use usergate::inbound::http::state::HttpState;
    /// use usergate::outbound::transport::{TcpClientConfig, TcpCommandClient};
    ///
    /// let transport = TcpCommandClient::new(TcpClientConfig::new("localhost:3001"));
    /// let state = HttpState::new(UsersClient::new(Arc::new(transport)));
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: UsersClient) -> Self {
        Self { users }
    }
}
