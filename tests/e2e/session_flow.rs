//! Full sessions: Engine + real transports + local peers

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chatline_app::handler::DECODE_FAILED_MESSAGE;
use chatline_app::{Engine, Message, RecordingRenderer, SessionState, Settings, UiCall};
use chatline_core::{ConnectionState, Role, TransportMode};
use chatline_transport::{
    resolve_endpoints, HttpTransport, WsTransport, EVENT_CHANNEL_CAPACITY,
};

use super::mock_server::{HttpMode, MockHttpServer, MockWsServer, WsMode};
use crate::{wait_for, TEST_TIMEOUT};

type RealEngine = Engine<WsTransport, HttpTransport, RecordingRenderer>;

struct Session {
    tx: mpsc::Sender<Message>,
    ui: RecordingRenderer,
    handle: JoinHandle<RealEngine>,
}

impl Session {
    fn start(settings: &Settings) -> Self {
        let endpoints = resolve_endpoints(
            &settings.connection.base_url,
            &settings.connection.ws_path,
            &settings.connection.http_path,
        )
        .unwrap();

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let primary = WsTransport::new(endpoints.primary, events_tx);
        let secondary = settings.connection.http_fallback.then(|| {
            HttpTransport::new(endpoints.secondary, Duration::from_secs(2)).unwrap()
        });
        let ui = RecordingRenderer::new();

        let mut engine = Engine::new(
            SessionState::with_settings(settings),
            primary,
            events_rx,
            secondary,
            ui.clone(),
        );
        let tx = engine.msg_sender();
        let handle = tokio::spawn(async move {
            engine.run().await;
            engine
        });

        Self { tx, ui, handle }
    }

    async fn say(&self, text: &str) {
        for msg in Message::submit_text(text) {
            self.tx.send(msg).await.unwrap();
        }
    }

    async fn wait_for_status(&self, state: ConnectionState) {
        let ui = self.ui.clone();
        wait_for(move || ui.calls().contains(&UiCall::Status(state))).await;
    }

    async fn finish(self) -> RealEngine {
        self.tx.send(Message::Shutdown).await.unwrap();
        tokio::time::timeout(TEST_TIMEOUT, self.handle)
            .await
            .expect("engine did not stop")
            .unwrap()
    }
}

fn settings_for(base_url: String) -> Settings {
    let mut settings = Settings::default();
    settings.connection.base_url = base_url;
    settings.reconnect.base_delay_ms = 10;
    settings.reconnect.max_delay_ms = 40;
    settings
}

#[tokio::test]
async fn test_chat_over_websocket() {
    let server = MockWsServer::start(WsMode::Echo).await;
    let session = Session::start(&settings_for(server.base_url()));

    session.wait_for_status(ConnectionState::Connected).await;
    wait_for(|| !server.received().is_empty()).await;

    session.say("hello").await;
    let ui = session.ui.clone();
    wait_for(move || {
        ui.messages()
            .contains(&(Role::Assistant, "echo: hello".to_string()))
    })
    .await;

    let ui = session.ui.clone();
    let engine = session.finish().await;

    let received = server.received();
    assert_eq!(received[0], r#"{"type":"message","content":"greeting"}"#);
    assert_eq!(received[1], r#"{"type":"message","content":"hello"}"#);
    assert_eq!(engine.state.mode, TransportMode::Primary);
    assert_eq!(engine.state.reconnect_attempts, 0);
    assert!(ui.errors().is_empty());
}

#[tokio::test]
async fn test_falls_back_to_http_when_websocket_unavailable() {
    let server = MockHttpServer::start(HttpMode::Echo).await;
    let session = Session::start(&settings_for(server.base_url()));

    session.wait_for_status(ConnectionState::Fallback).await;
    assert_eq!(session.ui.input_enabled(), Some(true));

    session.say("hello").await;
    let ui = session.ui.clone();
    wait_for(move || ui.messages().len() == 2).await;

    let ui = session.ui.clone();
    let engine = session.finish().await;

    assert_eq!(server.requests(), vec!["hello".to_string()]);
    assert_eq!(
        ui.messages(),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Assistant, "echo: hello".to_string()),
        ]
    );
    assert_eq!(engine.state.mode, TransportMode::Secondary);
    assert!(!engine.state.in_flight);
}

#[tokio::test]
async fn test_http_error_envelope_is_rendered() {
    let server = MockHttpServer::start(HttpMode::ErrorEnvelope("rate limited")).await;
    let session = Session::start(&settings_for(server.base_url()));

    session.wait_for_status(ConnectionState::Fallback).await;
    session.say("hello").await;
    let ui = session.ui.clone();
    wait_for(move || !ui.errors().is_empty()).await;

    let ui = session.ui.clone();
    let engine = session.finish().await;

    assert_eq!(ui.errors(), vec!["rate limited".to_string()]);
    assert!(!engine.state.in_flight);
}

#[tokio::test]
async fn test_no_fallback_reports_unreachable() {
    let server = MockHttpServer::start(HttpMode::Echo).await;
    let mut settings = settings_for(server.base_url());
    settings.connection.http_fallback = false;
    let session = Session::start(&settings);

    let ui = session.ui.clone();
    wait_for(move || !ui.errors().is_empty()).await;

    let engine = session.finish().await;

    assert!(engine.state.exhausted);
    assert_eq!(engine.state.connection, ConnectionState::Disconnected);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_undecodable_frame_leaves_connection_up() {
    let server = MockWsServer::start(WsMode::Garbage).await;
    let session = Session::start(&settings_for(server.base_url()));

    let ui = session.ui.clone();
    wait_for(move || ui.errors().contains(&DECODE_FAILED_MESSAGE.to_string())).await;

    let engine = session.finish().await;

    assert_eq!(engine.state.connection, ConnectionState::Connected);
}
