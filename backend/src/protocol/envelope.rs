//! Command and reply envelopes exchanged between the gateway and the users
//! service.
//!
//! ```text
//! -> {"id": 7, "command": "findOneUser", "payload": 3, "traceId": "…"}
//! <- {"id": 7, "result": {...}}
//! <- {"id": 7, "error": {"kind": "not_found", "message": "user 3 not found"}}
//! ```
//!
//! `id` is a correlation id assigned by the sender; replies echo it so a
//! single connection can carry many commands and answer them in any order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Error, ErrorCode, TraceId};

/// Request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFrame {
    pub id: u64,
    /// Kept as a raw string so unknown identifiers can still be answered.
    pub command: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<TraceId>,
}

/// Classified failure carried in a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub kind: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&Error> for WireError {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.code(),
            message: error.message().to_owned(),
            details: error.details().cloned(),
        }
    }
}

impl From<WireError> for Error {
    fn from(value: WireError) -> Self {
        let WireError {
            kind,
            message,
            details,
        } = value;
        let error = Self::new(kind, message);
        match details {
            Some(details) => error.with_details(details),
            None => error,
        }
    }
}

/// Reply frame. Exactly one of `result` and `error` is meaningful; a frame
/// with neither is a success whose result is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl ReplyFrame {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: &Error) -> Self {
        Self {
            id,
            result: None,
            error: Some(WireError::from(error)),
        }
    }

    /// Convert the reply into the caller's outcome.
    pub fn into_outcome(self) -> Result<Value, Error> {
        match self.error {
            Some(error) => Err(error.into()),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}
