//! Tests for the multiplexed command client against scripted TCP peers.

use super::*;
use crate::domain::{ErrorCode, UsersCommand};
use rstest::rstest;
use serde_json::json;
use tokio::net::TcpListener;

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr").to_string();
    (listener, address)
}

async fn accept(listener: &TcpListener) -> Framed<TcpStream, LengthDelimitedCodec> {
    let (stream, _) = listener.accept().await.expect("accept connection");
    framed(stream)
}

async fn read_command(peer: &mut Framed<TcpStream, LengthDelimitedCodec>) -> CommandFrame {
    let bytes = peer
        .next()
        .await
        .expect("frame available")
        .expect("frame readable");
    decode(&bytes).expect("command frame")
}

async fn write_reply(peer: &mut Framed<TcpStream, LengthDelimitedCodec>, reply: &ReplyFrame) {
    peer.send(encode(reply).expect("encode reply"))
        .await
        .expect("send reply");
}

fn client(address: String, timeout: Duration) -> TcpCommandClient {
    TcpCommandClient::new(TcpClientConfig::new(address).with_command_timeout(timeout))
}

fn find_one(id: i32) -> CommandRequest {
    CommandRequest::new(UsersCommand::FindOneUser, json!(id))
}

#[rstest]
#[tokio::test]
async fn replies_are_matched_by_correlation_id() {
    let (listener, address) = listener().await;
    let peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let first = read_command(&mut peer).await;
        let second = read_command(&mut peer).await;
        // Answer in reverse order, echoing each payload back.
        for frame in [second, first] {
            write_reply(&mut peer, &ReplyFrame::success(frame.id, frame.payload)).await;
        }
        peer
    });

    let client = client(address, Duration::from_secs(2));
    let (one, two) = tokio::join!(client.send(find_one(1)), client.send(find_one(2)));

    assert_eq!(one.expect("first reply"), json!(1));
    assert_eq!(two.expect("second reply"), json!(2));
    drop(peer.await.expect("peer finishes"));
}

#[rstest]
#[tokio::test]
async fn command_frame_carries_name_and_trace_id() {
    let (listener, address) = listener().await;
    let peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let frame = read_command(&mut peer).await;
        write_reply(&mut peer, &ReplyFrame::success(frame.id, Value::Null)).await;
        frame
    });

    let client = client(address, Duration::from_secs(2));
    let trace_id = TraceId::generate();
    TraceId::scope(trace_id, client.send(find_one(5)))
        .await
        .expect("reply");

    let frame = peer.await.expect("peer finishes");
    assert_eq!(frame.command, "findOneUser");
    assert_eq!(frame.payload, json!(5));
    assert_eq!(frame.trace_id, Some(trace_id));
}

#[rstest]
#[tokio::test]
async fn error_replies_keep_their_kind() {
    let (listener, address) = listener().await;
    let _peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let frame = read_command(&mut peer).await;
        let error = Error::not_found("user 9 not found");
        write_reply(&mut peer, &ReplyFrame::failure(frame.id, &error)).await;
        peer
    });

    let error = client(address, Duration::from_secs(2))
        .send(find_one(9))
        .await
        .expect_err("error reply");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "user 9 not found");
}

#[rstest]
#[case(json!({ "kind": "teapot", "message": "x" }))]
#[case(json!({ "message": "no kind" }))]
#[tokio::test]
async fn malformed_reply_with_known_id_fails_fast(#[case] error_body: Value) {
    let (listener, address) = listener().await;
    let _peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let frame = read_command(&mut peer).await;
        let body = json!({ "id": frame.id, "error": error_body });
        peer.send(encode(&body).expect("encode reply"))
            .await
            .expect("write reply");
        tokio::time::sleep(Duration::from_secs(5)).await;
        peer
    });

    let started = tokio::time::Instant::now();
    let error = client(address, Duration::from_secs(3))
        .send(find_one(1))
        .await
        .expect_err("malformed reply");
    assert_eq!(error.code(), ErrorCode::TransportFailure);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[rstest]
#[tokio::test]
async fn silent_peer_times_out() {
    let (listener, address) = listener().await;
    let _peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let _frame = read_command(&mut peer).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        peer
    });

    let error = client(address, Duration::from_millis(100))
        .send(find_one(1))
        .await
        .expect_err("no reply");
    assert_eq!(error.code(), ErrorCode::TransportTimeout);
}

#[rstest]
#[tokio::test]
async fn refused_connection_is_a_transport_failure() {
    let (listener, address) = listener().await;
    drop(listener);

    let error = client(address, Duration::from_secs(2))
        .send(find_one(1))
        .await
        .expect_err("nothing listening");
    assert_eq!(error.code(), ErrorCode::TransportFailure);
}

#[rstest]
#[tokio::test]
async fn dropped_connection_fails_in_flight_calls_then_reconnects() {
    let (listener, address) = listener().await;
    let peer = tokio::spawn(async move {
        let mut first = accept(&listener).await;
        let _ = read_command(&mut first).await;
        drop(first);

        let mut second = accept(&listener).await;
        let frame = read_command(&mut second).await;
        write_reply(&mut second, &ReplyFrame::success(frame.id, json!("again"))).await;
        second
    });

    let client = client(address, Duration::from_secs(2));
    let error = client
        .send(find_one(1))
        .await
        .expect_err("connection dropped mid-call");
    assert_eq!(error.code(), ErrorCode::TransportFailure);

    let value = client.send(find_one(2)).await.expect("reconnected");
    assert_eq!(value, json!("again"));
    drop(peer.await.expect("peer finishes"));
}

#[rstest]
#[tokio::test]
async fn late_replies_are_discarded() {
    let (listener, address) = listener().await;
    let _peer = tokio::spawn(async move {
        let mut peer = accept(&listener).await;
        let slow = read_command(&mut peer).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        write_reply(&mut peer, &ReplyFrame::success(slow.id, json!("late"))).await;
        let fast = read_command(&mut peer).await;
        write_reply(&mut peer, &ReplyFrame::success(fast.id, json!("fresh"))).await;
        peer
    });

    let client = client(address, Duration::from_millis(100));
    let error = client.send(find_one(1)).await.expect_err("times out");
    assert_eq!(error.code(), ErrorCode::TransportTimeout);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let value = client.send(find_one(2)).await.expect("fresh reply");
    assert_eq!(value, json!("fresh"));
}
