//! Test helpers for inbound HTTP components.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{CommandRequest, CommandTransport};
use crate::domain::{Error, UsersClient, UsersService};
use crate::inbound::command::{CommandRegistry, users_registry};
use crate::outbound::persistence::InMemoryUserRepository;
use crate::protocol::CommandFrame;

/// Transport that dispatches straight into a registry backed by the
/// in-memory repository, recording every request it carries.
pub struct InProcessTransport {
    registry: CommandRegistry,
    next_id: AtomicU64,
    sent: Mutex<Vec<CommandRequest>>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        let service = UsersService::new(Arc::new(InMemoryUserRepository::new()));
        let registry = users_registry(Arc::new(service)).expect("complete registry");
        Self {
            registry,
            next_id: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Requests sent so far, oldest first.
    pub fn sent(&self) -> Vec<CommandRequest> {
        self.sent.lock().expect("sent log lock").clone()
    }
}

#[async_trait]
impl CommandTransport for InProcessTransport {
    async fn send(&self, request: CommandRequest) -> Result<Value, Error> {
        self.sent
            .lock()
            .expect("sent log lock")
            .push(request.clone());
        let frame = CommandFrame {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            command: request.command.as_str().to_owned(),
            payload: request.payload,
            trace_id: None,
        };
        self.registry.dispatch(frame).await.into_outcome()
    }
}

/// Users client wired to a fresh [`InProcessTransport`].
pub fn in_process_users() -> (UsersClient, Arc<InProcessTransport>) {
    let transport = Arc::new(InProcessTransport::new());
    let client = UsersClient::new(transport.clone());
    (client, transport)
}
