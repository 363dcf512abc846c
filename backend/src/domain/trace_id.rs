//! Correlation id shared by the gateway and the users service.
//!
//! The gateway mints one per HTTP request, the users client copies it into
//! the `traceId` field of every command frame, and the users service runs the
//! matching handler with the same id in scope. Errors capture whatever id is
//! in scope when they are built, so an HTTP error body, its `trace-id` header
//! and both services' log lines all agree.
//!
//! The id lives in a tokio task-local. Spawned tasks start without one; wrap
//! them in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::task_local;
use uuid::Uuid;

/// HTTP response header carrying the id back to the caller.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID naming one gateway request and the command it produced.
///
/// On the wire it is the bare hyphenated UUID string.
///
/// # Examples
/// ```
/// use usergate::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// // A frame without `traceId` still gets an id on the service side.
/// let received: Option<TraceId> = None;
/// let id = TraceId::or_generate(received);
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random (v4) id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Continue the id a command frame carried, or start a new one.
    #[must_use]
    pub fn or_generate(received: Option<Self>) -> Self {
        received.unwrap_or_else(Self::generate)
    }

    /// Id of the request or command being handled by this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
