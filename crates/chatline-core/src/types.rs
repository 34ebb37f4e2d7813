//! Session-level domain types

use serde::Serialize;

/// Identifier of one `open()` of the primary transport.
///
/// Monotonically increasing within a session. Every primary event carries
/// the id of the connection that produced it, so completions from a
/// superseded attempt can be recognised and dropped.
pub type AttemptId = u64;

/// Lifecycle state of the conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Session created, nothing opened yet.
    #[default]
    Idle,
    /// Primary transport open in progress.
    Connecting,
    /// Primary transport open and carrying traffic.
    Connected,
    /// Primary transport lost; a retry may be pending.
    Disconnected,
    /// Primary abandoned; all traffic goes through the secondary transport.
    Fallback,
}

impl ConnectionState {
    /// Human-readable status label shown by the front end.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "Idle",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected - Attempting to reconnect...",
            ConnectionState::Fallback => "Connected (HTTP mode)",
        }
    }

    /// Whether user traffic can currently be carried.
    pub fn accepts_input(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Fallback)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Which transport carries outbound envelopes.
///
/// Monotonic: once `Secondary`, never `Primary` again in the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Primary,
    Secondary,
}

/// Author of a rendered conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}
