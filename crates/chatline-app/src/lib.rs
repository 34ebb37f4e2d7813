//! chatline-app - Session state machine and orchestration for chatline
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the chat
//! session: connection lifecycle with bounded exponential backoff, fallback
//! from the WebSocket to HTTP, and the one-outstanding-message dispatch
//! contract. The [`Engine`] feeds every event through one channel into
//! [`handler::update`]; presentation goes through the [`Renderer`] trait.

pub mod actions;
pub mod config;
pub mod engine;
pub mod handler;
pub mod message;
pub mod policy;
pub mod process;
pub mod render;
pub mod signals;
pub mod state;

// Re-export primary types
pub use config::Settings;
pub use engine::Engine;
pub use handler::{update, UpdateAction, UpdateResult};
pub use message::Message;
pub use policy::{Decision, ReconnectPolicy};
pub use render::Renderer;
pub use state::SessionState;

#[cfg(any(test, feature = "test-helpers"))]
pub use render::{RecordingRenderer, UiCall};
