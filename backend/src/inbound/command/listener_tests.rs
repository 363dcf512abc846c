//! Tests for the command listener over loopback TCP.

use std::time::Duration;

use super::*;
use crate::domain::{Error, ErrorCode, UsersCommand};
use bytes::Bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

type Client = Framed<TcpStream, LengthDelimitedCodec>;

/// Registry whose handlers echo what they observe.
#[fixture]
fn registry() -> Arc<CommandRegistry> {
    let registry = CommandRegistry::builder()
        .handle(UsersCommand::FindOneUser, |id: i32| async move {
            if id == 1 {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok::<_, Error>(id)
        })
        .handle(UsersCommand::FindAllUsers, |_: Value| async {
            Ok::<_, Error>(TraceId::current().map(|id| id.to_string()))
        })
        .handle(UsersCommand::CreateUser, |_: Value| async {
            Err::<Value, _>(Error::conflict("taken"))
        })
        .handle(UsersCommand::UpdateUser, |_: Value| async { Ok::<_, Error>(()) })
        .handle(UsersCommand::RemoveUser, |_: Value| async { Ok::<_, Error>(()) })
        .build()
        .expect("complete registry");
    Arc::new(registry)
}

async fn start(registry: Arc<CommandRegistry>) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr");
    let shutdown = CancellationToken::new();
    tokio::spawn(serve(listener, registry, shutdown.clone()));
    (address, shutdown)
}

async fn connect(address: SocketAddr) -> Client {
    framed(TcpStream::connect(address).await.expect("connect"))
}

async fn send(
    client: &mut Client,
    id: u64,
    command: &str,
    payload: Value,
    trace_id: Option<TraceId>,
) {
    let frame = CommandFrame {
        id,
        command: command.to_owned(),
        payload,
        trace_id,
    };
    client
        .send(encode(&frame).expect("encode"))
        .await
        .expect("send frame");
}

async fn receive(client: &mut Client) -> ReplyFrame {
    let body = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("reply before deadline")
        .expect("connection open")
        .expect("frame readable");
    decode(&body).expect("reply frame")
}

#[rstest]
#[tokio::test]
async fn slow_commands_do_not_block_later_ones(registry: Arc<CommandRegistry>) {
    let (address, _shutdown) = start(registry).await;
    let mut client = connect(address).await;

    send(&mut client, 10, "findOneUser", json!(1), None).await;
    send(&mut client, 11, "findOneUser", json!(2), None).await;

    let first = receive(&mut client).await;
    let second = receive(&mut client).await;
    assert_eq!((first.id, first.result), (11, Some(json!(2))));
    assert_eq!((second.id, second.result), (10, Some(json!(1))));
}

#[rstest]
#[tokio::test]
async fn handlers_run_under_the_frame_trace_id(registry: Arc<CommandRegistry>) {
    let (address, _shutdown) = start(registry).await;
    let mut client = connect(address).await;
    let trace_id = TraceId::generate();

    send(&mut client, 1, "findAllUsers", json!({}), Some(trace_id)).await;

    let reply = receive(&mut client).await;
    assert_eq!(reply.result, Some(json!(trace_id.to_string())));
}

#[rstest]
#[tokio::test]
async fn handlers_get_a_fresh_trace_id_when_none_is_sent(registry: Arc<CommandRegistry>) {
    let (address, _shutdown) = start(registry).await;
    let mut client = connect(address).await;

    send(&mut client, 1, "findAllUsers", json!({}), None).await;

    let reply = receive(&mut client).await;
    let observed = reply
        .result
        .as_ref()
        .and_then(Value::as_str)
        .map(str::parse::<TraceId>);
    assert!(matches!(observed, Some(Ok(_))), "got {observed:?}");
}

#[rstest]
#[tokio::test]
async fn unreadable_frames_are_skipped(registry: Arc<CommandRegistry>) {
    let (address, _shutdown) = start(registry).await;
    let mut client = connect(address).await;

    client
        .send(Bytes::from_static(b"not json"))
        .await
        .expect("send garbage");
    send(&mut client, 2, "createUser", json!({}), None).await;

    let reply = receive(&mut client).await;
    assert_eq!(reply.id, 2);
    assert_eq!(reply.error.map(|error| error.kind), Some(ErrorCode::Conflict));
}

#[rstest]
#[tokio::test]
async fn connections_are_independent(registry: Arc<CommandRegistry>) {
    let (address, _shutdown) = start(registry).await;
    let mut first = connect(address).await;
    let mut second = connect(address).await;

    send(&mut first, 1, "removeUser", json!(1), None).await;
    send(&mut second, 1, "updateUser", json!({}), None).await;

    assert_eq!(receive(&mut first).await.into_outcome(), Ok(Value::Null));
    assert_eq!(receive(&mut second).await.into_outcome(), Ok(Value::Null));
}

#[rstest]
#[tokio::test]
async fn cancelling_stops_the_listener(registry: Arc<CommandRegistry>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(listener, registry, shutdown.clone()));

    shutdown.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(2), server)
        .await
        .expect("listener stops")
        .expect("task joins");
    assert!(outcome.is_ok());
}
