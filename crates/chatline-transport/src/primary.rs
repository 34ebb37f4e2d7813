//! Primary (duplex) transport contract
//!
//! A primary transport is opened once per connection attempt and reports its
//! lifecycle through [`PrimaryEvent`]s pushed on an `mpsc` channel supplied at
//! construction. Each event is tagged with the [`AttemptId`] passed to
//! [`PrimaryTransport::open`], so the session can drop completions from a
//! superseded attempt.
//!
//! Per attempt the transport emits at most one `Opened`, any number of
//! `Frame`s while open, and at most one terminal event (`Closed` or `Error`).
//! A deliberate [`PrimaryTransport::close`] emits nothing.

use chatline_core::prelude::*;
use chatline_core::{AttemptId, MessageEnvelope};

/// Capacity of the event channel handed to primary transports.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Connection state of the current attempt, as seen by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No attempt in progress, or the last one has ended.
    #[default]
    Closed,
    /// Handshake in progress.
    Connecting,
    /// Frames can be sent.
    Open,
}

/// What happened on the primary link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryEventKind {
    /// Connection established.
    Opened,
    /// Peer closed the connection or the stream ended.
    Closed,
    /// Connection could not be established or failed while open.
    Error(String),
    /// A text frame arrived. Decoding is left to the session.
    Frame(String),
}

/// A lifecycle event of one primary attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryEvent {
    pub attempt: AttemptId,
    pub kind: PrimaryEventKind,
}

impl PrimaryEvent {
    pub fn new(attempt: AttemptId, kind: PrimaryEventKind) -> Self {
        Self { attempt, kind }
    }

    /// Whether this event ends the attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            PrimaryEventKind::Closed | PrimaryEventKind::Error(_)
        )
    }
}

/// A duplex, message-oriented connection.
///
/// All methods are non-blocking. `open` returns immediately and reports the
/// outcome as an event; `send` fails synchronously when the link is not open.
pub trait PrimaryTransport {
    /// Start connection attempt `attempt`.
    ///
    /// Any previous connection is released first, so repeated retries never
    /// hold more than one socket.
    fn open(&mut self, attempt: AttemptId);

    /// Queue one envelope for transmission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] unless the current attempt is open, or a
    /// transport error if the frame cannot be queued.
    fn send(&self, envelope: &MessageEnvelope) -> Result<()>;

    /// Release the current connection, if any. Emits no event.
    fn close(&mut self);

    /// State of the current attempt.
    fn link_state(&self) -> LinkState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(PrimaryEvent::new(1, PrimaryEventKind::Closed).is_terminal());
        assert!(PrimaryEvent::new(1, PrimaryEventKind::Error("reset".into())).is_terminal());
        assert!(!PrimaryEvent::new(1, PrimaryEventKind::Opened).is_terminal());
        assert!(!PrimaryEvent::new(1, PrimaryEventKind::Frame("{}".into())).is_terminal());
    }

    #[test]
    fn test_link_state_default_closed() {
        assert_eq!(LinkState::default(), LinkState::Closed);
    }
}
