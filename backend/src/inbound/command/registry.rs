//! Command registry for the users service.
//!
//! Maps every [`UsersCommand`] to exactly one handler. Handlers receive the
//! decoded payload and return a serialisable result; the registry owns payload
//! decoding and reply encoding so handlers stay typed.
//!
//! ```text
//! findOneUser  -> UserId        -> User
//! removeUser   -> UserId        -> null
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::ports::UserRepository;
use crate::domain::{
    Error, ErrorCode, NewUser, UpdateUserPayload, UserId, UsersCommand, UsersService,
};
use crate::protocol::{CommandFrame, ReplyFrame};

type Handler = Box<dyn Fn(Value) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync>;

/// Raised when a registry does not map each command to exactly one handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("command {command} has more than one handler")]
    Duplicate { command: UsersCommand },
    #[error("commands without a handler: {missing:?}")]
    Missing { missing: Vec<UsersCommand> },
}

/// Accumulates handlers before the completeness check.
#[derive(Default)]
pub struct CommandRegistryBuilder {
    handlers: HashMap<UsersCommand, Handler>,
    duplicate: Option<UsersCommand>,
}

impl CommandRegistryBuilder {
    /// Register `handler` for `command`.
    ///
    /// The payload is decoded into `P` before the handler runs; a payload that
    /// does not decode is answered with `invalid_request` without calling it.
    #[must_use]
    pub fn handle<P, T, F, Fut>(mut self, command: UsersCommand, handler: F) -> Self
    where
        P: DeserializeOwned,
        T: Serialize + Send,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let handler: Handler = Box::new(move |payload: Value| {
            match serde_json::from_value::<P>(payload) {
                Ok(payload) => {
                    let pending = handler(payload);
                    async move {
                        let result = pending.await?;
                        serde_json::to_value(result).map_err(|err| {
                            Error::internal(format!("failed to encode {command} result: {err}"))
                        })
                    }
                    .boxed()
                }
                Err(err) => {
                    let error = invalid_payload(command, &err);
                    async move { Err(error) }.boxed()
                }
            }
        });
        if self.handlers.insert(command, handler).is_some() {
            self.duplicate.get_or_insert(command);
        }
        self
    }

    /// Finish the registry, rejecting duplicate or missing handlers.
    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        if let Some(command) = self.duplicate {
            return Err(RegistryError::Duplicate { command });
        }
        let missing: Vec<_> = UsersCommand::ALL
            .into_iter()
            .filter(|command| !self.handlers.contains_key(command))
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::Missing { missing });
        }
        Ok(CommandRegistry {
            handlers: self.handlers,
        })
    }
}

fn invalid_payload(command: UsersCommand, err: &serde_json::Error) -> Error {
    Error::invalid_request(format!("invalid {command} payload: {err}")).with_details(json!({
        "command": command.as_str(),
        "code": "invalid_payload",
    }))
}

/// Complete mapping from command to handler.
pub struct CommandRegistry {
    handlers: HashMap<UsersCommand, Handler>,
}

impl CommandRegistry {
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::default()
    }

    /// Run the handler named by `frame` and build its reply.
    pub async fn dispatch(&self, frame: CommandFrame) -> ReplyFrame {
        let CommandFrame {
            id,
            command,
            payload,
            ..
        } = frame;

        let outcome = match command.parse::<UsersCommand>() {
            Ok(command) => match self.handlers.get(&command) {
                Some(handler) => handler(payload).await,
                None => Err(Error::internal(format!("no handler for {command}"))),
            },
            Err(err) => Err(Error::invalid_request(err.to_string())
                .with_details(json!({ "command": command.as_str(), "code": "unknown_command" }))),
        };

        match outcome {
            Ok(result) => {
                debug!(id, %command, "command handled");
                ReplyFrame::success(id, result)
            }
            Err(error) => {
                match error.code() {
                    ErrorCode::InternalError | ErrorCode::ServiceUnavailable => {
                        warn!(id, %command, code = %error.code(), error = %error, "command failed");
                    }
                    _ => debug!(id, %command, code = %error.code(), "command rejected"),
                }
                ReplyFrame::failure(id, &error)
            }
        }
    }
}

/// Registry wiring each users command to its [`UsersService`] use-case.
pub fn users_registry<R>(service: Arc<UsersService<R>>) -> Result<CommandRegistry, RegistryError>
where
    R: UserRepository + 'static,
{
    let create = Arc::clone(&service);
    let find_all = Arc::clone(&service);
    let find_one = Arc::clone(&service);
    let update = Arc::clone(&service);
    let remove = service;

    CommandRegistry::builder()
        .handle(UsersCommand::CreateUser, move |user: NewUser| {
            let service = Arc::clone(&create);
            async move { service.create_user(user).await }
        })
        // The payload carries no data, so any value is accepted.
        .handle(UsersCommand::FindAllUsers, move |_: Value| {
            let service = Arc::clone(&find_all);
            async move { service.find_all_users().await }
        })
        .handle(UsersCommand::FindOneUser, move |id: UserId| {
            let service = Arc::clone(&find_one);
            async move { service.find_one_user(id).await }
        })
        .handle(UsersCommand::UpdateUser, move |payload: UpdateUserPayload| {
            let service = Arc::clone(&update);
            async move {
                service
                    .update_user(payload.id, payload.update_fields)
                    .await
            }
        })
        .handle(UsersCommand::RemoveUser, move |id: UserId| {
            let service = Arc::clone(&remove);
            async move { service.remove_user(id).await }
        })
        .build()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
