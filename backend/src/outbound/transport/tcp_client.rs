//! Multiplexed TCP client for the users service command transport.
//!
//! One connection is shared by every gateway request. A connection task owns
//! the socket and the table of pending calls; callers hand it a frame plus a
//! oneshot sender and wait on the receiver under the command timeout. Replies
//! are matched by correlation id, so they may arrive in any order.
//!
//! The connection opens lazily on the first call and again on the first call
//! after it drops. Calls are never retried: a call in flight when the
//! connection drops fails with `transport_failure`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, info, warn};

use crate::domain::ports::{CommandRequest, CommandTransport};
use crate::domain::{Error, TraceId};
use crate::protocol::{CommandFrame, ReplyFrame, decode, encode, framed};

/// Default time a gateway request waits for its reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

const OUTBOUND_QUEUE_DEPTH: usize = 256;

/// Connection settings for [`TcpCommandClient`].
#[derive(Debug, Clone)]
pub struct TcpClientConfig {
    address: String,
    command_timeout: Duration,
}

impl TcpClientConfig {
    /// Target the users service at `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

/// Why the connection task could not deliver a reply.
#[derive(Debug)]
struct TransportFault(String);

type ReplySender = oneshot::Sender<Result<ReplyFrame, TransportFault>>;

struct Outgoing {
    frame: CommandFrame,
    reply: ReplySender,
}

/// [`CommandTransport`] over a single multiplexed TCP connection.
pub struct TcpCommandClient {
    config: TcpClientConfig,
    next_id: AtomicU64,
    connection: Mutex<Option<mpsc::Sender<Outgoing>>>,
}

impl TcpCommandClient {
    pub fn new(config: TcpClientConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            connection: Mutex::new(None),
        }
    }

    async fn connection(&self) -> Result<mpsc::Sender<Outgoing>, Error> {
        let mut guard = self.connection.lock().await;
        if let Some(sender) = guard.as_ref().filter(|sender| !sender.is_closed()) {
            return Ok(sender.clone());
        }

        let address = self.config.address();
        let stream = TcpStream::connect(address).await.map_err(|err| {
            warn!(%address, error = %err, "users service unreachable");
            Error::transport_failure(format!("cannot reach users service at {address}: {err}"))
        })?;
        if let Err(err) = stream.set_nodelay(true) {
            debug!(error = %err, "failed to disable Nagle on command connection");
        }
        info!(%address, "connected to users service");

        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        tokio::spawn(run_connection(framed(stream), receiver));
        *guard = Some(sender.clone());
        Ok(sender)
    }

    async fn exchange(&self, frame: CommandFrame) -> Result<ReplyFrame, Error> {
        let sender = self.connection().await?;
        let (reply, receiver) = oneshot::channel();
        sender
            .send(Outgoing { frame, reply })
            .await
            .map_err(|_| Error::transport_failure("connection to users service closed"))?;
        receiver
            .await
            .map_err(|_| Error::transport_failure("connection to users service closed"))?
            .map_err(|TransportFault(message)| Error::transport_failure(message))
    }
}

#[async_trait]
impl CommandTransport for TcpCommandClient {
    async fn send(&self, request: CommandRequest) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let command = request.command;
        let frame = CommandFrame {
            id,
            command: command.as_str().to_owned(),
            payload: request.payload,
            trace_id: TraceId::current(),
        };

        let timeout = self.config.command_timeout();
        match tokio::time::timeout(timeout, self.exchange(frame)).await {
            Ok(reply) => reply?.into_outcome(),
            Err(_) => {
                warn!(%command, id, timeout_ms = timeout.as_millis(), "command timed out");
                Err(Error::transport_timeout(format!(
                    "no reply to {command} within {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

/// Correlation id of a reply whose body cannot be read.
#[derive(Deserialize)]
struct ReplyId {
    id: u64,
}

fn complete(reply: ReplySender, outcome: Result<ReplyFrame, TransportFault>) {
    if reply.send(outcome).is_err() {
        debug!("caller stopped waiting before the reply was delivered");
    }
}

/// Own the socket until either side closes it, then fail what is pending.
async fn run_connection(
    mut socket: Framed<TcpStream, LengthDelimitedCodec>,
    mut outgoing: mpsc::Receiver<Outgoing>,
) {
    let mut pending: HashMap<u64, ReplySender> = HashMap::new();

    let reason = loop {
        tokio::select! {
            next = outgoing.recv() => {
                let Some(Outgoing { frame, reply }) = next else {
                    break "client dropped".to_owned();
                };
                // Callers that timed out leave closed senders behind.
                pending.retain(|_, waiting| !waiting.is_closed());
                let body = match encode(&frame) {
                    Ok(body) => body,
                    Err(err) => {
                        complete(reply, Err(TransportFault(format!("cannot encode command: {err}"))));
                        continue;
                    }
                };
                if let Err(err) = socket.send(body).await {
                    complete(reply, Err(TransportFault(format!("failed to send command: {err}"))));
                    break format!("write failed: {err}");
                }
                pending.insert(frame.id, reply);
            }
            incoming = socket.next() => match incoming {
                Some(Ok(bytes)) => match decode::<ReplyFrame>(&bytes) {
                    Ok(frame) => match pending.remove(&frame.id) {
                        Some(reply) => complete(reply, Ok(frame)),
                        None => debug!(id = frame.id, "discarding reply with no waiting caller"),
                    },
                    Err(err) => match decode::<ReplyId>(&bytes) {
                        Ok(ReplyId { id }) => match pending.remove(&id) {
                            Some(reply) => {
                                warn!(id, error = %err, "users service sent a malformed reply");
                                complete(
                                    reply,
                                    Err(TransportFault(format!("malformed reply: {err}"))),
                                );
                            }
                            None => debug!(id, "discarding malformed reply with no waiting caller"),
                        },
                        Err(_) => warn!(error = %err, "discarding unreadable reply frame"),
                    },
                },
                Some(Err(err)) => break format!("read failed: {err}"),
                None => break "closed by users service".to_owned(),
            },
        }
    };

    // Closing first makes the next call open a fresh connection.
    outgoing.close();
    while let Ok(Outgoing { reply, .. }) = outgoing.try_recv() {
        complete(reply, Err(TransportFault(format!("connection to users service lost: {reason}"))));
    }

    if pending.is_empty() {
        info!(%reason, "command connection ended");
    } else {
        warn!(%reason, in_flight = pending.len(), "command connection lost with calls in flight");
    }
    for (_, reply) in pending.drain() {
        complete(
            reply,
            Err(TransportFault(format!("connection to users service lost: {reason}"))),
        );
    }
}

#[cfg(test)]
#[path = "tcp_client_tests.rs"]
mod tests;
