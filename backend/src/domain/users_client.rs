//! Gateway-side facade that turns user operations into commands.
//!
//! `UsersClient` holds no business logic: it builds the payload for each
//! command, sends exactly one command per call, and decodes the reply.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{CommandRequest, CommandTransport};
use crate::domain::{
    Error, NewUser, NoPayload, UpdateUserPayload, User, UserId, UserPatch, UsersCommand,
};

/// Typed client for the users service.
#[derive(Clone)]
pub struct UsersClient {
    transport: Arc<dyn CommandTransport>,
}

impl UsersClient {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        Self { transport }
    }

    async fn call<P, T>(&self, command: UsersCommand, payload: &P) -> Result<T, Error>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload)
            .map_err(|err| Error::internal(format!("failed to encode {command} payload: {err}")))?;
        debug!(%command, "dispatching command");
        let reply = self
            .transport
            .send(CommandRequest::new(command, payload))
            .await?;
        decode_reply(command, reply)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, Error> {
        self.call(UsersCommand::CreateUser, user).await
    }

    pub async fn find_all_users(&self) -> Result<Vec<User>, Error> {
        self.call(UsersCommand::FindAllUsers, &NoPayload::default())
            .await
    }

    pub async fn find_one_user(&self, id: UserId) -> Result<User, Error> {
        self.call(UsersCommand::FindOneUser, &id).await
    }

    /// Send `{id, updateFields}` where `updateFields` holds only the fields
    /// the caller supplied.
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error> {
        let payload = UpdateUserPayload {
            id,
            update_fields: patch,
        };
        self.call(UsersCommand::UpdateUser, &payload).await
    }

    pub async fn remove_user(&self, id: UserId) -> Result<(), Error> {
        let _: Value = self.call(UsersCommand::RemoveUser, &id).await?;
        Ok(())
    }
}

fn decode_reply<T: DeserializeOwned>(command: UsersCommand, reply: Value) -> Result<T, Error> {
    serde_json::from_value(reply).map_err(|err| {
        Error::transport_failure(format!("malformed {command} reply: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockCommandTransport;
    use crate::domain::{ErrorCode, UserName};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    fn stored_user_json(id: i32, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": "ana@x.com",
            "password": "secret1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        })
    }

    fn client(transport: MockCommandTransport) -> UsersClient {
        UsersClient::new(Arc::new(transport))
    }

    #[rstest]
    #[tokio::test]
    async fn update_sends_only_supplied_fields() {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .with(eq(CommandRequest::new(
                UsersCommand::UpdateUser,
                json!({ "id": 1, "updateFields": { "name": "Ana Maria" } }),
            )))
            .times(1)
            .return_once(|_| Ok(stored_user_json(1, "Ana Maria")));

        let patch = UserPatch {
            name: Some(UserName::new("Ana Maria").expect("valid name")),
            ..UserPatch::default()
        };
        let user = client(transport)
            .update_user(UserId::new(1).expect("positive id"), patch)
            .await
            .expect("update succeeds");
        assert_eq!(user.name().as_ref(), "Ana Maria");
    }

    #[rstest]
    #[tokio::test]
    async fn empty_patch_sends_empty_update_fields() {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .with(eq(CommandRequest::new(
                UsersCommand::UpdateUser,
                json!({ "id": 4, "updateFields": {} }),
            )))
            .times(1)
            .return_once(|_| Ok(stored_user_json(4, "Ana")));

        client(transport)
            .update_user(UserId::new(4).expect("positive id"), UserPatch::default())
            .await
            .expect("update succeeds");
    }

    #[rstest]
    #[case(UsersCommand::FindOneUser)]
    #[case(UsersCommand::RemoveUser)]
    #[tokio::test]
    async fn id_commands_send_bare_number(#[case] command: UsersCommand) {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .with(eq(CommandRequest::new(command, json!(9))))
            .times(1)
            .return_once(|_| Ok(stored_user_json(9, "Ana")));

        let client = client(transport);
        let id = UserId::new(9).expect("positive id");
        match command {
            UsersCommand::FindOneUser => {
                client.find_one_user(id).await.expect("find succeeds");
            }
            _ => client.remove_user(id).await.expect("remove succeeds"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn find_all_sends_empty_object() {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .with(eq(CommandRequest::new(UsersCommand::FindAllUsers, json!({}))))
            .times(1)
            .return_once(|_| Ok(json!([stored_user_json(1, "Ana")])));

        let users = client(transport)
            .find_all_users()
            .await
            .expect("list succeeds");
        assert_eq!(users.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_reply_is_a_transport_failure() {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .times(1)
            .return_once(|_| Ok(json!({ "unexpected": true })));

        let error = client(transport)
            .find_one_user(UserId::new(1).expect("positive id"))
            .await
            .expect_err("reply cannot be decoded");
        assert_eq!(error.code(), ErrorCode::TransportFailure);
    }

    #[rstest]
    #[tokio::test]
    async fn remote_errors_pass_through_unchanged() {
        let mut transport = MockCommandTransport::new();
        transport
            .expect_send()
            .times(1)
            .return_once(|_| Err(Error::not_found("user 3 not found")));

        let error = client(transport)
            .find_one_user(UserId::new(3).expect("positive id"))
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "user 3 not found");
    }
}
