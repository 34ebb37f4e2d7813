//! # chatline-transport - Connection Plumbing
//!
//! The two channels a chat session can talk through, behind one trait each.
//!
//! Depends on [`chatline_core`] for the envelope and error types.
//!
//! ## Public API
//!
//! ### Primary (duplex)
//! - [`PrimaryTransport`] - Open / send / close contract with event reporting
//! - [`PrimaryEvent`], [`PrimaryEventKind`] - Attempt-tagged lifecycle events
//! - [`WsTransport`] - WebSocket implementation (`tokio-tungstenite`)
//!
//! ### Secondary (request/response)
//! - [`SecondaryTransport`] - One request, one reply
//! - [`HttpTransport`] - HTTP GET implementation (`reqwest`)
//!
//! ### Endpoints
//! - [`resolve_endpoints()`] - Derive `ws(s)://` and `http(s)://` endpoints from a base URL

pub mod endpoint;
pub mod http;
pub mod primary;
pub mod secondary;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod websocket;

pub use endpoint::{resolve_endpoints, Endpoints, DEFAULT_HTTP_PATH, DEFAULT_WS_PATH};
pub use http::{HttpTransport, DEFAULT_REQUEST_TIMEOUT};
pub use primary::{
    LinkState, PrimaryEvent, PrimaryEventKind, PrimaryTransport, EVENT_CHANNEL_CAPACITY,
};
pub use secondary::{LocalSecondaryTransport, SecondaryTransport};
pub use websocket::WsTransport;
