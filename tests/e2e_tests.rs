//! End-to-end tests over real WebSocket connections.


use futures_util::{SinkExt, StreamExt};
use pair_signal_server::protocol::*;
use pair_signal_server::server::{PairingServer, ServerConfig};
use pair_signal_server::websocket::run_server;
use std::sync::Arc;
use test_helpers::{create_test_server, create_test_server_with_config, test_server_config};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsSender = futures_util::stream::SplitSink<WsStream, Message>;
type WsReceiver = futures_util::stream::SplitStream<WsStream>;

async fn start_test_server() -> std::net::SocketAddr {
    start_server_with_instance(create_test_server()).await
}

async fn start_test_server_with_config(server_config: ServerConfig) -> std::net::SocketAddr {
    start_server_with_instance(create_test_server_with_config(server_config)).await
}

async fn start_server_with_instance(server: Arc<PairingServer>) -> std::net::SocketAddr {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    // Bound before spawning, so connections queue until the server accepts.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Err(e) = run_server(listener, server, "*").await {
            eprintln!("test server stopped: {e}");
        }
    });

    addr
}

async fn connect_client(addr: std::net::SocketAddr) -> (WsSender, WsReceiver) {
    let url = format!("ws://{addr}/ws");
    let (ws_stream, _) = timeout(Duration::from_secs(10), connect_async(&url))
        .await
        .expect("WebSocket connection timed out after 10 seconds")
        .expect("Failed to connect");
    ws_stream.split()
}

/// Connect and consume the `connected` frame, returning the assigned id.
async fn connect_and_identify(addr: std::net::SocketAddr) -> (ClientId, WsSender, WsReceiver) {
    let (sender, mut receiver) = connect_client(addr).await;
    match receive(&mut receiver).await {
        ServerMessage::Connected { client_id } => (client_id, sender, receiver),
        other => panic!("expected connected frame first, got {other:?}"),
    }
}

async fn send(sender: &mut WsSender, message: &ClientMessage) {
    let json = serde_json::to_string(message).expect("client message serializes");
    sender
        .send(Message::Text(json.into()))
        .await
        .expect("send frame");
}

async fn send_raw(sender: &mut WsSender, text: &str) {
    sender
        .send(Message::Text(text.to_string().into()))
        .await
        .expect("send frame");
}

/// Next server event, skipping transport-level ping/pong frames.
async fn receive(receiver: &mut WsReceiver) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(5), receiver.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("websocket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("valid ServerMessage");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

/// Assert nothing arrives within a short window.
async fn assert_silent(receiver: &mut WsReceiver) {
    let result = timeout(Duration::from_millis(200), receiver.next()).await;
    assert!(result.is_err(), "expected no frame, got {result:?}");
}

#[tokio::test]
async fn test_connected_is_first_frame() {
    let addr = start_test_server().await;

    let (first, _s1, _r1) = connect_and_identify(addr).await;
    let (second, _s2, _r2) = connect_and_identify(addr).await;

    assert_ne!(first, second, "every socket gets its own id");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pairing_signal_and_chat_over_sockets() {
    let addr = start_test_server().await;

    let (a_id, mut a_tx, mut a_rx) = connect_and_identify(addr).await;
    let (b_id, mut b_tx, mut b_rx) = connect_and_identify(addr).await;

    send(&mut a_tx, &ClientMessage::Ready).await;
    assert_silent(&mut a_rx).await;
    send(&mut b_tx, &ClientMessage::Ready).await;

    assert_eq!(
        receive(&mut b_rx).await,
        ServerMessage::Matched { peer_id: a_id }
    );
    assert_eq!(
        receive(&mut a_rx).await,
        ServerMessage::Matched { peer_id: b_id }
    );

    let offer = serde_json::json!({"type": "offer", "sdp": "v=0\r\n"});
    send(
        &mut a_tx,
        &ClientMessage::Signal {
            to: Some(b_id),
            data: Some(offer.clone()),
        },
    )
    .await;
    assert_eq!(
        receive(&mut b_rx).await,
        ServerMessage::Signal {
            from: a_id,
            data: offer
        }
    );

    send(
        &mut b_tx,
        &ClientMessage::ChatMessage {
            message: Some(serde_json::json!("  hello there  ")),
        },
    )
    .await;
    match receive(&mut a_rx).await {
        ServerMessage::ChatMessage {
            from,
            message,
            timestamp,
        } => {
            assert_eq!(from, b_id);
            assert_eq!(message, "hello there");
            assert!(timestamp > 0);
        }
        other => panic!("expected chat message, got {other:?}"),
    }
    assert_silent(&mut b_rx).await;
}

#[tokio::test]
async fn test_ping_pong() {
    let addr = start_test_server().await;
    let (_id, mut tx, mut rx) = connect_and_identify(addr).await;

    send(&mut tx, &ClientMessage::Ping).await;
    assert_eq!(receive(&mut rx).await, ServerMessage::Pong);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let addr = start_test_server().await;
    let (_id, mut tx, mut rx) = connect_and_identify(addr).await;

    send_raw(&mut tx, "this is not json").await;
    send_raw(&mut tx, r#"{"type":"createRoom","data":{}}"#).await;
    send_raw(&mut tx, r#"{"type":"chatMessage","data":{"message":42}}"#).await;
    assert_silent(&mut rx).await;

    // The socket is still usable afterwards.
    send(&mut tx, &ClientMessage::Ping).await;
    assert_eq!(receive(&mut rx).await, ServerMessage::Pong);
}

#[tokio::test]
async fn test_oversized_frame_gets_error() {
    let addr = start_test_server_with_config(ServerConfig {
        max_message_size: 1024,
        ..test_server_config()
    })
    .await;
    let (_id, mut tx, mut rx) = connect_and_identify(addr).await;

    send(
        &mut tx,
        &ClientMessage::ChatMessage {
            message: Some(serde_json::json!("x".repeat(2048))),
        },
    )
    .await;

    match receive(&mut rx).await {
        ServerMessage::Error { error_code, .. } => {
            assert_eq!(error_code, Some(ErrorCode::MessageTooLarge));
        }
        other => panic!("expected error frame, got {other:?}"),
    }

    send(&mut tx, &ClientMessage::Ping).await;
    assert_eq!(receive(&mut rx).await, ServerMessage::Pong);
}

#[tokio::test]
async fn test_websocket_connection_limit_enforced() {
    let addr = start_test_server_with_config(ServerConfig {
        max_connections_per_ip: 1,
        ..test_server_config()
    })
    .await;

    let (_first, mut sender1, receiver1) = connect_and_identify(addr).await;

    let (_sender2, mut receiver2) = connect_client(addr).await;
    match receive(&mut receiver2).await {
        ServerMessage::Error {
            error_code,
            message,
        } => {
            assert_eq!(
                error_code,
                Some(ErrorCode::TooManyConnections),
                "second connection should be rejected"
            );
            assert!(message.contains("1/1"));
        }
        other => panic!("expected error message, got {other:?}"),
    }

    let _ = sender1.close().await;
    drop(receiver1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_socket_close_notifies_partner() {
    let addr = start_test_server().await;

    let (_a_id, mut a_tx, mut a_rx) = connect_and_identify(addr).await;
    let (_b_id, mut b_tx, mut b_rx) = connect_and_identify(addr).await;

    send(&mut a_tx, &ClientMessage::Ready).await;
    send(&mut b_tx, &ClientMessage::Ready).await;
    assert!(matches!(receive(&mut a_rx).await, ServerMessage::Matched { .. }));
    assert!(matches!(receive(&mut b_rx).await, ServerMessage::Matched { .. }));

    a_tx.close().await.expect("close frame sent");
    drop(a_rx);

    assert_eq!(receive(&mut b_rx).await, ServerMessage::PartnerLeft);

    // The survivor can queue up again and match a newcomer.
    send(&mut b_tx, &ClientMessage::Ready).await;
    let (_c_id, mut c_tx, mut c_rx) = connect_and_identify(addr).await;
    send(&mut c_tx, &ClientMessage::Ready).await;
    assert!(matches!(receive(&mut c_rx).await, ServerMessage::Matched { .. }));
    assert!(matches!(receive(&mut b_rx).await, ServerMessage::Matched { .. }));
}
