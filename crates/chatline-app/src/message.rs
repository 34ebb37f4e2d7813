//! Message types for the session (TEA pattern)
//!
//! Every input to the state machine, whether from the user, a transport,
//! or a timer, arrives as one [`Message`] on the engine's channel and is
//! processed to completion before the next.

use chatline_core::{AttemptId, MessageEnvelope};
use chatline_transport::PrimaryEvent;

/// All possible messages/actions in the session
#[derive(Debug, Clone)]
pub enum Message {
    /// Begin the session: open the primary transport.
    Start,

    /// Lifecycle event from the primary transport.
    Primary(PrimaryEvent),

    /// A reconnection timer armed after attempt `attempt` failed has elapsed.
    RetryElapsed { attempt: AttemptId },

    // ─────────────────────────────────────────────────────────
    // Dispatch Messages
    // ─────────────────────────────────────────────────────────
    /// Replace the input buffer.
    InputChanged(String),

    /// Submit the input buffer.
    Submit,

    /// A secondary transport request finished.
    ///
    /// The error side is the transport error rendered to text.
    SecondaryCompleted {
        result: Result<MessageEnvelope, String>,
    },

    /// End the session.
    Shutdown,
}

impl Message {
    /// Convenience for front ends that deliver whole lines at once.
    pub fn submit_text(text: impl Into<String>) -> [Message; 2] {
        [Message::InputChanged(text.into()), Message::Submit]
    }
}
