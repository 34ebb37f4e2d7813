//! Local chat service peers for integration testing
//!
//! [`MockWsServer`] speaks the WebSocket side of the chat protocol using
//! `tokio-tungstenite`; [`MockHttpServer`] serves `GET /api/chat` with
//! `axum`. Both bind to an ephemeral loopback port and stop when dropped.
//!
//! The echo modes answer `{"type":"message","content":X}` with
//! `{"type":"message","content":"echo: X"}`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use url::Url;

type Recorded = Arc<Mutex<Vec<String>>>;

fn echo_reply(content: &str) -> Value {
    json!({ "type": "message", "content": format!("echo: {content}") })
}

// ─────────────────────────────────────────────────────────
// WebSocket peer
// ─────────────────────────────────────────────────────────

/// Behavior of a [`MockWsServer`] connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsMode {
    /// Answer every text frame with an echo envelope.
    Echo,
    /// Complete the handshake, then send a Close frame.
    CloseAfterOpen,
    /// Complete the handshake, then send one frame that is not JSON.
    Garbage,
}

pub struct MockWsServer {
    addr: SocketAddr,
    received: Recorded,
    task: JoinHandle<()>,
}

impl MockWsServer {
    pub async fn start(mode: WsMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received: Recorded = Arc::default();

        let log = Arc::clone(&received);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    serve_ws(ws, mode, log).await;
                });
            }
        });

        Self {
            addr,
            received,
            task,
        }
    }

    /// Base URL a client would be configured with.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> Url {
        Url::parse(&format!("ws://{}/ws/chat", self.addr)).unwrap()
    }

    /// Raw text frames received from clients, in order.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_ws<S>(ws: tokio_tungstenite::WebSocketStream<S>, mode: WsMode, log: Recorded)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    match mode {
        WsMode::CloseAfterOpen => {
            let _ = sink.send(WsMessage::Close(None)).await;
            return;
        }
        WsMode::Garbage => {
            let _ = sink.send(WsMessage::Text("not json".into())).await;
        }
        WsMode::Echo => {}
    }

    while let Some(Ok(frame)) = stream.next().await {
        let WsMessage::Text(text) = frame else {
            continue;
        };
        log.lock().unwrap().push(text.as_str().to_owned());

        if mode != WsMode::Echo {
            continue;
        }
        let content = serde_json::from_str::<Value>(text.as_str())
            .ok()
            .and_then(|value| value["content"].as_str().map(str::to_owned))
            .unwrap_or_default();
        let reply = echo_reply(&content).to_string();
        if sink.send(WsMessage::Text(reply.into())).await.is_err() {
            break;
        }
    }
}

// ─────────────────────────────────────────────────────────
// HTTP peer
// ─────────────────────────────────────────────────────────

/// Behavior of a [`MockHttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMode {
    /// Answer with an echo envelope.
    Echo,
    /// Answer with an error envelope carrying this text.
    ErrorEnvelope(&'static str),
    /// Answer with this status code and an empty body.
    Status(u16),
    /// Answer 200 with a body that is not JSON.
    Garbage,
}

#[derive(Clone)]
struct HttpState {
    mode: HttpMode,
    requests: Recorded,
}

pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Recorded,
    task: JoinHandle<()>,
}

impl MockHttpServer {
    pub async fn start(mode: HttpMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Recorded = Arc::default();

        let app = Router::new()
            .route("/api/chat", get(chat))
            .with_state(HttpState {
                mode,
                requests: Arc::clone(&requests),
            });
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Base URL a client would be configured with. There is no WebSocket
    /// route, so the primary handshake to this origin always fails.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn chat_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/chat", self.addr)).unwrap()
    }

    /// `message` query values received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn chat(
    State(state): State<HttpState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let message = params.get("message").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(message.clone());

    match state.mode {
        HttpMode::Echo => Json(echo_reply(&message)).into_response(),
        HttpMode::ErrorEnvelope(text) => {
            Json(json!({ "type": "error", "content": text })).into_response()
        }
        HttpMode::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        HttpMode::Garbage => "not json".into_response(),
    }
}
