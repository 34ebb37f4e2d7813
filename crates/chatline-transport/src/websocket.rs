//! WebSocket implementation of the primary transport.
//!
//! Each [`PrimaryTransport::open`] spawns one background task that owns the
//! socket for that attempt. The public handle talks to the task over a
//! bounded command channel; the task reports back through the shared
//! [`PrimaryEvent`] channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WsTransport                            │
//! │                                                              │
//! │  ┌──────────────┐        ┌──────────────────────────────┐   │
//! │  │   Public API │        │   Link task (one per attempt) │   │
//! │  │              │        │                                │   │
//! │  │  send()   ───┼──cmd──▶│  connect, then read/write loop │   │
//! │  │  close()  ───┼──cmd──▶│                                │   │
//! │  │              │        │  Opened / Frame / Closed /     │   │
//! │  │  events   ◀──┼──evt──◀│  Error → PrimaryEvent channel  │   │
//! │  └──────────────┘        └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconnection is not handled here: the session decides when to call
//! `open` again.

use std::sync::{Arc, RwLock};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use chatline_core::prelude::*;
use chatline_core::{AttemptId, MessageEnvelope};

use crate::primary::{LinkState, PrimaryEvent, PrimaryEventKind, PrimaryTransport};

/// Capacity of the command channel (bounded, to apply backpressure).
const CMD_CHANNEL_CAPACITY: usize = 32;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

type SharedLinkState = Arc<RwLock<LinkState>>;

/// Messages sent from the handle to the link task.
enum LinkCommand {
    /// Write one text frame.
    Send(String),
    /// Send a Close frame and stop.
    Close,
}

/// Per-attempt resources held by the handle.
struct ActiveLink {
    attempt: AttemptId,
    cmd_tx: mpsc::Sender<LinkCommand>,
    state: SharedLinkState,
    task: JoinHandle<()>,
}

/// WebSocket client used as the primary transport.
pub struct WsTransport {
    url: Url,
    events: mpsc::Sender<PrimaryEvent>,
    link: Option<ActiveLink>,
}

impl WsTransport {
    /// Create a transport for `url` that reports on `events`.
    ///
    /// Nothing is connected until [`PrimaryTransport::open`] is called.
    pub fn new(url: Url, events: mpsc::Sender<PrimaryEvent>) -> Self {
        Self {
            url,
            events,
            link: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Id of the attempt currently owning the socket, if any.
    #[cfg(test)]
    fn current_attempt(&self) -> Option<AttemptId> {
        self.link.as_ref().map(|link| link.attempt)
    }
}

impl PrimaryTransport for WsTransport {
    fn open(&mut self, attempt: AttemptId) {
        self.close();

        let (cmd_tx, cmd_rx) = mpsc::channel::<LinkCommand>(CMD_CHANNEL_CAPACITY);
        let state: SharedLinkState = Arc::new(RwLock::new(LinkState::Connecting));

        info!("Opening WebSocket {} (attempt {})", self.url, attempt);
        let task = tokio::spawn(run_link_task(
            self.url.to_string(),
            attempt,
            cmd_rx,
            self.events.clone(),
            Arc::clone(&state),
        ));

        self.link = Some(ActiveLink {
            attempt,
            cmd_tx,
            state,
            task,
        });
    }

    fn send(&self, envelope: &MessageEnvelope) -> Result<()> {
        let link = self.link.as_ref().ok_or(Error::NotOpen)?;
        if read_state(&link.state) != LinkState::Open {
            return Err(Error::NotOpen);
        }

        let json = envelope.to_json()?;
        link.cmd_tx
            .try_send(LinkCommand::Send(json))
            .map_err(|err| Error::transport(format!("Failed to queue frame: {err}")))
    }

    fn close(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };

        match read_state(&link.state) {
            LinkState::Open => {
                // The task sends a Close frame and exits on its own.
                debug!("Closing WebSocket (attempt {})", link.attempt);
                let _ = link.cmd_tx.try_send(LinkCommand::Close);
            }
            LinkState::Connecting => {
                debug!("Aborting pending WebSocket handshake (attempt {})", link.attempt);
                link.task.abort();
            }
            LinkState::Closed => {}
        }
        write_state(&link.state, LinkState::Closed);
    }

    fn link_state(&self) -> LinkState {
        self.link
            .as_ref()
            .map(|link| read_state(&link.state))
            .unwrap_or_default()
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Link task
// ---------------------------------------------------------------------------

/// Entry point for one attempt's background task.
///
/// Emits `Opened` once the handshake completes, then `Frame`s until the link
/// ends with exactly one `Closed` or `Error`. A `Close` command (or the
/// handle dropping the channel) ends the task without an event.
async fn run_link_task(
    url: String,
    attempt: AttemptId,
    mut cmd_rx: mpsc::Receiver<LinkCommand>,
    events: mpsc::Sender<PrimaryEvent>,
    state: SharedLinkState,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(err) => {
            warn!("WebSocket: attempt {} failed to connect: {}", attempt, err);
            write_state(&state, LinkState::Closed);
            emit(&events, attempt, PrimaryEventKind::Error(err.to_string())).await;
            return;
        }
    };

    write_state(&state, LinkState::Open);
    info!("WebSocket: connected (attempt {})", attempt);
    emit(&events, attempt, PrimaryEventKind::Opened).await;

    let ending = run_io_loop(ws_stream, attempt, &mut cmd_rx, &events).await;

    write_state(&state, LinkState::Closed);
    if let Some(kind) = ending {
        emit(&events, attempt, kind).await;
    }
    debug!("WebSocket link task exiting (attempt {})", attempt);
}

/// Run one connection's read/write select loop.
///
/// Returns the terminal event to report, or `None` when the handle asked for
/// the close.
async fn run_io_loop(
    ws_stream: WsStream,
    attempt: AttemptId,
    cmd_rx: &mut mpsc::Receiver<LinkCommand>,
    events: &mpsc::Sender<PrimaryEvent>,
) -> Option<PrimaryEventKind> {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            // ── Incoming WebSocket frame ─────────────────────────────────
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        trace!("WebSocket: received {} bytes", text.len());
                        emit(events, attempt, PrimaryEventKind::Frame(text.as_str().to_owned())).await;
                    }
                    Some(Ok(WsMessage::Binary(bytes))) => {
                        // Binary frames still go through the envelope decoder.
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        emit(events, attempt, PrimaryEventKind::Frame(text)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("WebSocket: received Close frame");
                        return Some(PrimaryEventKind::Closed);
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong are answered by tungstenite
                    }
                    Some(Err(err)) => {
                        warn!("WebSocket: read error: {}", err);
                        return Some(PrimaryEventKind::Error(err.to_string()));
                    }
                    None => {
                        debug!("WebSocket: stream ended");
                        return Some(PrimaryEventKind::Closed);
                    }
                }
            }

            // ── Outgoing command from the handle ─────────────────────────
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(LinkCommand::Send(json)) => {
                        if let Err(err) = ws_sink.send(WsMessage::Text(json.into())).await {
                            warn!("WebSocket: write error: {}", err);
                            return Some(PrimaryEventKind::Error(err.to_string()));
                        }
                    }
                    Some(LinkCommand::Close) | None => {
                        send_close(&mut ws_sink).await;
                        return None;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn emit(events: &mpsc::Sender<PrimaryEvent>, attempt: AttemptId, kind: PrimaryEventKind) {
    if events.send(PrimaryEvent::new(attempt, kind)).await.is_err() {
        debug!("WebSocket: event receiver dropped (attempt {})", attempt);
    }
}

/// Send a WebSocket Close frame, ignoring any write errors.
async fn send_close(ws_sink: &mut SplitSink<WsStream, WsMessage>) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}

fn read_state(state: &SharedLinkState) -> LinkState {
    *state.read().unwrap_or_else(|e| e.into_inner())
}

fn write_state(state: &SharedLinkState, value: LinkState) {
    let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
    *guard = value;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
