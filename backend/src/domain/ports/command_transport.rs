//! Driven port for sending commands to the users service.
//!
//! The gateway's use-cases depend on this trait only; the TCP adapter lives in
//! `outbound::transport`, and tests substitute a mock or an in-process stub.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Error, UsersCommand};

/// A single command with its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub command: UsersCommand,
    pub payload: Value,
}

impl CommandRequest {
    pub fn new(command: UsersCommand, payload: Value) -> Self {
        Self { command, payload }
    }
}

/// Request/reply transport. One call sends one command and resolves with
/// exactly one reply.
///
/// Implementations return the reply's `result` on success and rebuild the
/// reply's classified error otherwise. Failures of the transport itself map to
/// [`crate::domain::ErrorCode::TransportFailure`] or
/// [`crate::domain::ErrorCode::TransportTimeout`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn send(&self, request: CommandRequest) -> Result<Value, Error>;
}
