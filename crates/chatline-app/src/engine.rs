//! Engine - owns the session, its transports, and the message channel
//!
//! Every input (primary transport events, retry timers, secondary request
//! completions, user input, OS signals) is funneled into one `mpsc` channel
//! and processed one message at a time, so the state machine never observes
//! two events concurrently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use chatline_transport::{PrimaryEvent, PrimaryTransport, SecondaryTransport};

use crate::actions::TaskHandles;
use crate::message::Message;
use crate::process;
use crate::render::Renderer;
use crate::state::SessionState;

/// Capacity of the unified message channel.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Orchestration engine for one chat session.
pub struct Engine<P, S, R> {
    /// Session state (the Model)
    pub state: SessionState,

    primary: P,

    /// `None` when HTTP fallback is disabled.
    secondary: Option<Arc<S>>,

    renderer: R,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (stdin reader, signal handler).
    msg_tx: mpsc::Sender<Message>,

    msg_rx: mpsc::Receiver<Message>,

    tasks: TaskHandles,

    /// Forwards primary transport events into the message channel.
    event_bridge: JoinHandle<()>,
}

impl<P, S, R> Engine<P, S, R>
where
    P: PrimaryTransport,
    S: SecondaryTransport + Sync + 'static,
    R: Renderer,
{
    /// Create an engine. Must be called inside a tokio runtime.
    ///
    /// `primary_events` is the receiving end of the channel `primary` reports
    /// on. Without a `secondary`, exhaustion leaves the session disconnected
    /// regardless of `state.fallback_available`.
    pub fn new(
        mut state: SessionState,
        primary: P,
        primary_events: mpsc::Receiver<PrimaryEvent>,
        secondary: Option<S>,
        renderer: R,
    ) -> Self {
        state.fallback_available &= secondary.is_some();

        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        let event_bridge = spawn_event_bridge(primary_events, msg_tx.clone());

        Self {
            state,
            primary,
            secondary: secondary.map(Arc::new),
            renderer,
            msg_tx,
            msg_rx,
            tasks: TaskHandles::default(),
            event_bridge,
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Process a single message through the TEA update cycle.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(
            &mut self.state,
            msg,
            &mut self.primary,
            self.secondary.as_ref(),
            &mut self.renderer,
            &self.msg_tx,
            &mut self.tasks,
        );
    }

    /// Drain and process all pending messages without waiting.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Start the session and process messages until it quits.
    pub async fn run(&mut self) {
        self.process_message(Message::Start);

        while !self.should_quit() {
            match self.msg_rx.recv().await {
                Some(msg) => self.process_message(msg),
                None => break,
            }
        }

        self.shutdown();
    }

    /// Stop background tasks and release the primary transport.
    pub fn shutdown(&mut self) {
        info!("Engine shutting down");
        self.tasks.abort_all();
        self.primary.close();
        self.event_bridge.abort();
    }
}

fn spawn_event_bridge(
    mut events: mpsc::Receiver<PrimaryEvent>,
    msg_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if msg_tx.send(Message::Primary(event)).await.is_err() {
                break;
            }
        }
        debug!("Primary event bridge exiting");
    })
}
