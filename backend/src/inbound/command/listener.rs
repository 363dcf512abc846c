//! TCP listener serving the users command transport.
//!
//! Each accepted connection gets a reader loop and a single writer task.
//! Every decoded command runs in its own task under the caller's trace id, so
//! slow commands do not hold up later ones on the same connection. Replies
//! reach the writer through a channel in completion order.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::CommandRegistry;
use crate::domain::TraceId;
use crate::protocol::{CommandFrame, ReplyFrame, decode, encode, framed};

const REPLY_QUEUE_DEPTH: usize = 256;

/// Accept connections until `shutdown` is cancelled.
///
/// # Examples
/// ```no_run
/// # async fn run(registry: std::sync::Arc<usergate::inbound::command::CommandRegistry>) -> std::io::Result<()> {
/// use tokio::net::TcpListener;
/// use tokio_util::sync::CancellationToken;
///
/// let listener = TcpListener::bind("0.0.0.0:3001").await?;
/// usergate::inbound::command::serve(listener, registry, CancellationToken::new()).await
/// # }
/// ```
pub async fn serve(
    listener: TcpListener,
    registry: Arc<CommandRegistry>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let address = listener.local_addr()?;
    info!(%address, "users service listening for commands");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                info!(%address, "command listener stopping");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_connection(
                        stream,
                        peer,
                        Arc::clone(&registry),
                        shutdown.child_token(),
                    ));
                }
                Err(err) => warn!(error = %err, "failed to accept command connection"),
            },
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<CommandRegistry>,
    shutdown: CancellationToken,
) {
    info!(%peer, "command connection opened");
    if let Err(err) = stream.set_nodelay(true) {
        debug!(%peer, error = %err, "failed to disable Nagle on command connection");
    }
    let (mut sink, mut frames) = framed(stream).split();
    let (replies, mut outbox) = mpsc::channel::<ReplyFrame>(REPLY_QUEUE_DEPTH);

    let writer = tokio::spawn(async move {
        while let Some(reply) = outbox.recv().await {
            let body = match encode(&reply) {
                Ok(body) => body,
                Err(err) => {
                    warn!(%peer, id = reply.id, error = %err, "failed to encode reply");
                    continue;
                }
            };
            if let Err(err) = sink.send(body).await {
                warn!(%peer, error = %err, "failed to write reply");
                break;
            }
        }
    });

    loop {
        let next = tokio::select! {
            () = shutdown.cancelled() => break,
            next = frames.next() => next,
        };
        match next {
            Some(Ok(body)) => match decode::<CommandFrame>(&body) {
                Ok(frame) => spawn_command(frame, &registry, replies.clone()),
                Err(err) => warn!(%peer, error = %err, "skipping unreadable command frame"),
            },
            Some(Err(err)) => {
                warn!(%peer, error = %err, "command connection failed");
                break;
            }
            None => break,
        }
    }

    // The writer drains once every in-flight command has replied.
    drop(replies);
    if let Err(err) = writer.await {
        warn!(%peer, error = %err, "reply writer task failed");
    }
    info!(%peer, "command connection closed");
}

fn spawn_command(
    frame: CommandFrame,
    registry: &Arc<CommandRegistry>,
    replies: mpsc::Sender<ReplyFrame>,
) {
    let registry = Arc::clone(registry);
    let trace_id = TraceId::or_generate(frame.trace_id);
    tokio::spawn(TraceId::scope(trace_id, async move {
        let reply = registry.dispatch(frame).await;
        if replies.send(reply).await.is_err() {
            debug!("connection closed before the reply was written");
        }
    }));
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
