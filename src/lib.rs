//! chatline Library
//!
//! A terminal chat client that talks to a chat service over WebSocket and
//! falls back to HTTP when the socket cannot be kept up.

pub mod console;

// Re-export main entry points
pub use console::runner::run_console;
pub use console::{ConsoleRenderer, OutputFormat};
