//! # chatline-core - Core Domain Types
//!
//! Foundation crate for chatline. Provides the message envelope, session
//! lifecycle types, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Envelope (`envelope`)
//! - [`MessageEnvelope`] - The `{type, content}` unit exchanged with the service
//! - [`EnvelopeKind`] - `message` or `error`
//!
//! ### Domain Types (`types`)
//! - [`ConnectionState`] - Session lifecycle (Idle, Connecting, Connected, Disconnected, Fallback)
//! - [`TransportMode`] - Primary (WebSocket) or Secondary (HTTP)
//! - [`Role`] - Author of a rendered entry
//! - [`AttemptId`] - Sequence number of a primary `open()`
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use chatline_core::prelude::*;
//! ```

pub mod envelope;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use envelope::{EnvelopeKind, MessageEnvelope, GREETING_CONTENT};
pub use error::{Error, Result, ResultExt};
pub use types::{AttemptId, ConnectionState, Role, TransportMode};
