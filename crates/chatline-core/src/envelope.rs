//! Message envelope exchanged with the chat service
//!
//! Both directions use the same JSON shape:
//!
//! ```json
//! {"type": "message", "content": "hello"}
//! {"type": "error", "content": "rate limited"}
//! ```
//!
//! The client only ever sends `"message"` envelopes. An inbound `"error"`
//! envelope is a server-reported failure for the current turn.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Content of the synthetic handshake sent right after the primary
/// transport opens.
pub const GREETING_CONTENT: &str = "greeting";

/// Discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Message,
    Error,
}

/// The structured message unit exchanged in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub content: String,
}

/// Wire form accepted on decode. Any `type` other than `"error"` is read as
/// a normal message.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    content: String,
}

impl MessageEnvelope {
    /// Create an outbound `"message"` envelope.
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Message,
            content: content.into(),
        }
    }

    /// Create an `"error"` envelope. Only servers (and test peers) send these.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            content: content.into(),
        }
    }

    /// The handshake envelope sent once per established primary connection.
    pub fn greeting() -> Self {
        Self::message(GREETING_CONTENT)
    }

    pub fn is_error(&self) -> bool {
        self.kind == EnvelopeKind::Error
    }

    /// Serialize to the JSON text sent on the wire.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an inbound payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the payload is not JSON or lacks a
    /// string `content` field.
    pub fn decode(raw: &str) -> Result<Self> {
        let raw: RawEnvelope =
            serde_json::from_str(raw).map_err(|e| Error::decode(e.to_string()))?;
        let kind = match raw.kind.as_deref() {
            Some("error") => EnvelopeKind::Error,
            _ => EnvelopeKind::Message,
        };
        Ok(Self {
            kind,
            content: raw.content,
        })
    }
}
