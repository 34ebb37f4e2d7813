//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `connection`: Primary transport lifecycle, reconnection, fallback
//! - `dispatch`: User submissions and inbound envelopes

pub(crate) mod connection;
pub(crate) mod dispatch;
pub(crate) mod update;


use std::time::Duration;

use crate::message::Message;
use chatline_core::{AttemptId, MessageEnvelope};

// Re-export main entry point
pub use update::update;

/// Error entry shown when a primary send fails synchronously.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send message";

/// Error entry shown when a secondary request fails.
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

/// Error entry shown when an inbound payload cannot be decoded.
pub const DECODE_FAILED_MESSAGE: &str = "Error processing message";

/// Error entry shown when the link drops while a reply is outstanding.
pub const CONNECTION_LOST_MESSAGE: &str = "Connection lost before a response arrived";

/// Error entry shown when reconnection is exhausted without a fallback.
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server.";

/// Actions that the engine should perform after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Start primary connection attempt `attempt`
    OpenPrimary { attempt: AttemptId },

    /// Release the primary connection
    ClosePrimary,

    /// Post `Message::RetryElapsed { attempt }` after `delay`
    ScheduleRetry { attempt: AttemptId, delay: Duration },

    /// Run one secondary request and post `Message::SecondaryCompleted`
    SendSecondary { envelope: MessageEnvelope },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the engine to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
