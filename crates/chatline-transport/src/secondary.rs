//! Secondary (request/response) transport contract
//!
//! Each request is a complete, self-contained conversational turn: it
//! resolves with exactly one response envelope or fails with a transport
//! error. There are no lifecycle events.

use chatline_core::prelude::*;
use chatline_core::MessageEnvelope;

/// Unary request/response channel used once the primary is abandoned.
#[trait_variant::make(SecondaryTransport: Send)]
pub trait LocalSecondaryTransport {
    /// Perform one request carrying `envelope` and return the reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] on network failure
    /// - [`Error::HttpStatus`] on a non-success status
    /// - [`Error::Decode`] if the body is not an envelope
    async fn request(&self, envelope: &MessageEnvelope) -> Result<MessageEnvelope>;
}
