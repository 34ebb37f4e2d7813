//! WsTransport against a local WebSocket peer

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use url::Url;

use chatline_core::MessageEnvelope;
use chatline_transport::{
    LinkState, PrimaryEventKind, PrimaryTransport, WsTransport, EVENT_CHANNEL_CAPACITY,
};

use super::mock_server::{MockWsServer, WsMode};
use crate::next_event;

#[tokio::test]
async fn test_open_send_receive_close() {
    let server = MockWsServer::start(WsMode::Echo).await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut transport = WsTransport::new(server.ws_url(), tx);

    transport.open(1);
    let event = next_event(&mut rx).await;
    assert_eq!(event.attempt, 1);
    assert!(matches!(event.kind, PrimaryEventKind::Opened));
    assert_eq!(transport.link_state(), LinkState::Open);

    transport.send(&MessageEnvelope::message("hello")).unwrap();
    let event = next_event(&mut rx).await;
    match event.kind {
        PrimaryEventKind::Frame(raw) => {
            let reply = MessageEnvelope::decode(&raw).unwrap();
            assert_eq!(reply, MessageEnvelope::message("echo: hello"));
        }
        other => panic!("expected a frame, got {other:?}"),
    }
    assert_eq!(
        server.received(),
        vec![r#"{"type":"message","content":"hello"}"#.to_string()]
    );

    transport.close();
    assert_eq!(transport.link_state(), LinkState::Closed);

    // A deliberate close reports nothing.
    let quiet = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(quiet.is_err());
}

#[tokio::test]
async fn test_peer_close_reports_terminal_event() {
    let server = MockWsServer::start(WsMode::CloseAfterOpen).await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut transport = WsTransport::new(server.ws_url(), tx);

    transport.open(4);
    assert!(matches!(
        next_event(&mut rx).await.kind,
        PrimaryEventKind::Opened
    ));

    let event = next_event(&mut rx).await;
    assert_eq!(event.attempt, 4);
    assert!(event.is_terminal());
    assert_eq!(transport.link_state(), LinkState::Closed);
}

#[tokio::test]
async fn test_refused_handshake_reports_error() {
    // Grab a free port, then release it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("ws://{addr}/ws/chat")).unwrap();
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut transport = WsTransport::new(url, tx);

    transport.open(2);
    let event = next_event(&mut rx).await;

    assert_eq!(event.attempt, 2);
    assert!(matches!(event.kind, PrimaryEventKind::Error(_)));
}

#[tokio::test]
async fn test_reopen_after_peer_close_uses_new_attempt() {
    let server = MockWsServer::start(WsMode::CloseAfterOpen).await;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut transport = WsTransport::new(server.ws_url(), tx);

    transport.open(1);
    next_event(&mut rx).await;
    next_event(&mut rx).await;

    transport.open(2);
    let event = next_event(&mut rx).await;
    assert_eq!(event.attempt, 2);
    assert!(matches!(event.kind, PrimaryEventKind::Opened));
}
