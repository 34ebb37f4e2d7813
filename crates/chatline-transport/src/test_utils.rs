//! Test doubles for both transports
//!
//! [`FakePrimary`] and [`FakeSecondary`] are cheap to clone; clones share the
//! same recorded history, so a test can keep one copy while the session
//! owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use chatline_core::prelude::*;
use chatline_core::{AttemptId, MessageEnvelope};

use crate::primary::{LinkState, PrimaryEvent, PrimaryEventKind, PrimaryTransport};
use crate::secondary::SecondaryTransport;

/// How a [`FakePrimary`] reacts to `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenBehavior {
    /// Stay in `Connecting`; the test delivers events itself.
    #[default]
    Manual,
    /// Immediately report `Opened`.
    Accept,
    /// Immediately report `Error`.
    Refuse,
}

#[derive(Debug, Default)]
struct FakePrimaryInner {
    behavior: OpenBehavior,
    events: Option<mpsc::Sender<PrimaryEvent>>,
    link: LinkState,
    current: Option<AttemptId>,
    opens: Vec<AttemptId>,
    closes: usize,
    sent: Vec<MessageEnvelope>,
    fail_sends: bool,
}

/// Scriptable primary transport that records every call.
#[derive(Debug, Clone, Default)]
pub struct FakePrimary {
    inner: Arc<Mutex<FakePrimaryInner>>,
}

impl FakePrimary {
    /// A fake that never emits events on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that answers every `open` on `events` according to `behavior`.
    pub fn with_behavior(behavior: OpenBehavior, events: mpsc::Sender<PrimaryEvent>) -> Self {
        let fake = Self::default();
        {
            let mut inner = fake.lock();
            inner.behavior = behavior;
            inner.events = Some(events);
        }
        fake
    }

    /// Change how subsequent `open` calls are answered.
    pub fn set_behavior(&self, behavior: OpenBehavior) {
        self.lock().behavior = behavior;
    }

    /// Force the link state, e.g. to simulate an established connection.
    pub fn set_link_state(&self, state: LinkState) {
        self.lock().link = state;
    }

    /// Make every `send` fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.lock().fail_sends = fail;
    }

    /// Attempt ids passed to `open`, in call order.
    pub fn opens(&self) -> Vec<AttemptId> {
        self.lock().opens.clone()
    }

    /// Number of `close` calls.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    /// Envelopes accepted by `send`, in call order.
    pub fn sent(&self) -> Vec<MessageEnvelope> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakePrimaryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PrimaryTransport for FakePrimary {
    fn open(&mut self, attempt: AttemptId) {
        let mut inner = self.lock();
        inner.opens.push(attempt);
        inner.current = Some(attempt);

        let reply = match inner.behavior {
            OpenBehavior::Manual => {
                inner.link = LinkState::Connecting;
                None
            }
            OpenBehavior::Accept => {
                inner.link = LinkState::Open;
                Some(PrimaryEventKind::Opened)
            }
            OpenBehavior::Refuse => {
                inner.link = LinkState::Closed;
                Some(PrimaryEventKind::Error("connection refused".to_string()))
            }
        };

        if let (Some(kind), Some(events)) = (reply, inner.events.as_ref()) {
            if events.try_send(PrimaryEvent::new(attempt, kind)).is_err() {
                warn!("FakePrimary: event channel full or closed");
            }
        }
    }

    fn send(&self, envelope: &MessageEnvelope) -> Result<()> {
        let mut inner = self.lock();
        if inner.link != LinkState::Open {
            return Err(Error::NotOpen);
        }
        if inner.fail_sends {
            return Err(Error::transport("simulated write failure"));
        }
        inner.sent.push(envelope.clone());
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.lock();
        inner.closes += 1;
        inner.current = None;
        inner.link = LinkState::Closed;
    }

    fn link_state(&self) -> LinkState {
        self.lock().link
    }
}

#[derive(Debug, Default)]
struct FakeSecondaryInner {
    replies: VecDeque<std::result::Result<MessageEnvelope, String>>,
    requests: Vec<MessageEnvelope>,
}

/// Secondary transport that replays scripted replies.
///
/// When the script is empty, requests fail with a transport error.
#[derive(Debug, Clone, Default)]
pub struct FakeSecondary {
    inner: Arc<Mutex<FakeSecondaryInner>>,
}

impl FakeSecondary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, envelope: MessageEnvelope) {
        self.lock().replies.push_back(Ok(envelope));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().replies.push_back(Err(message.into()));
    }

    /// Envelopes received so far.
    pub fn requests(&self) -> Vec<MessageEnvelope> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeSecondaryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SecondaryTransport for FakeSecondary {
    async fn request(&self, envelope: &MessageEnvelope) -> Result<MessageEnvelope> {
        let mut inner = self.lock();
        inner.requests.push(envelope.clone());
        match inner.replies.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::http(message)),
            None => Err(Error::http("no scripted reply")),
        }
    }
}
