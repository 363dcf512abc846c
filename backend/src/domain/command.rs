//! Closed set of commands understood by the users service.
//!
//! The gateway and the users service agree on these identifiers; anything
//! outside the set is rejected at the edge instead of being routed by string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{UserId, UserPatch};

/// Named command sent from the gateway to the users service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsersCommand {
    CreateUser,
    FindAllUsers,
    FindOneUser,
    UpdateUser,
    RemoveUser,
}

impl UsersCommand {
    /// Every command; handler registries must cover all of them.
    pub const ALL: [Self; 5] = [
        Self::CreateUser,
        Self::FindAllUsers,
        Self::FindOneUser,
        Self::UpdateUser,
        Self::RemoveUser,
    ];

    /// Wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "createUser",
            Self::FindAllUsers => "findAllUsers",
            Self::FindOneUser => "findOneUser",
            Self::UpdateUser => "updateUser",
            Self::RemoveUser => "removeUser",
        }
    }
}

impl fmt::Display for UsersCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a wire identifier names no known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for UsersCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_owned()))
    }
}

/// Payload of [`UsersCommand::UpdateUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub id: UserId,
    pub update_fields: UserPatch,
}

/// Payload of [`UsersCommand::FindAllUsers`]; always the empty object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoPayload {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn wire_names_match_serde_spelling() {
        for command in UsersCommand::ALL {
            let value = serde_json::to_value(command).expect("serialise command");
            assert_eq!(value.as_str(), Some(command.as_str()));
            assert_eq!(command.as_str().parse::<UsersCommand>(), Ok(command));
        }
    }

    #[rstest]
    #[case("find_all_users")]
    #[case("CreateUser")]
    #[case("")]
    fn unknown_identifiers_are_rejected(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<UsersCommand>(),
            Err(UnknownCommand(raw.to_owned()))
        );
    }

    #[rstest]
    fn update_payload_uses_update_fields_key() {
        let payload: UpdateUserPayload =
            serde_json::from_value(json!({ "id": 3, "updateFields": {} })).expect("payload");
        assert_eq!(payload.id.get(), 3);
        assert!(payload.update_fields.is_empty());
    }

    #[rstest]
    fn no_payload_is_empty_object() {
        let value = serde_json::to_value(NoPayload::default()).expect("serialise");
        assert_eq!(value, json!({}));
    }
}
