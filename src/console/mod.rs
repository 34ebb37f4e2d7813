//! Console front end - line-oriented chat on stdin/stdout
//!
//! [`ConsoleRenderer`] implements the session's [`Renderer`] for a terminal.
//! In plain mode it prints one line per conversation entry; with `--json` it
//! emits NDJSON events so scripts can drive a session without parsing text.
//!
//! # Plain Output
//!
//! ```text
//! [Connecting...]
//! [Connected]
//! you> hello
//! bot> Hi! How can I help?
//! error: rate limited
//! ```
//!
//! # JSON Output
//!
//! ```json
//! {"event":"status","state":"connected","label":"Connected","timestamp":1704700001000}
//! {"event":"message","role":"user","content":"hello","timestamp":1704700002000}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use chatline_app::Renderer;
use chatline_core::{ConnectionState, Role};

/// How the console presents the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Events emitted in JSON output mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// Conversation entry
    Message {
        role: &'static str,
        content: String,
        timestamp: i64,
    },

    /// Standalone error entry
    Error { message: String, timestamp: i64 },

    /// Connection status changed
    Status {
        state: ConnectionState,
        label: String,
        timestamp: i64,
    },

    /// Input enabled or disabled
    Input { enabled: bool, timestamp: i64 },

    /// Loading indicator shown or hidden
    Loading { visible: bool, timestamp: i64 },
}

impl ConsoleEvent {
    pub fn message(role: Role, content: &str) -> Self {
        Self::Message {
            role: role.as_str(),
            content: content.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn status(state: ConnectionState, label: &str) -> Self {
        Self::Status {
            state,
            label: label.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn input(enabled: bool) -> Self {
        Self::Input {
            enabled,
            timestamp: Self::now(),
        }
    }

    pub fn loading(visible: bool) -> Self {
        Self::Loading {
            visible,
            timestamp: Self::now(),
        }
    }

    /// Current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Plain-mode line printed when input stops being accepted.
pub const INPUT_PAUSED_NOTICE: &str = "[input paused]";

/// Terminal renderer writing to stdout (or any writer, for tests).
pub struct ConsoleRenderer {
    format: OutputFormat,
    out: Box<dyn Write + Send>,
    input_enabled: bool,
}

impl ConsoleRenderer {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::with_writer(format, Box::new(io::stdout()))
    }

    pub fn with_writer(format: OutputFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            out,
            input_enabled: false,
        }
    }

    fn emit(&mut self, event: ConsoleEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize console event: {}", e);
                return;
            }
        };
        self.write_line(&json);
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            error!("Failed to write to console: {}", e);
            return;
        }
        if let Err(e) = self.out.flush() {
            error!("Failed to flush console: {}", e);
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn render_message(&mut self, role: Role, text: &str) {
        match self.format {
            OutputFormat::Plain => {
                let prefix = match role {
                    Role::User => "you",
                    Role::Assistant => "bot",
                };
                self.write_line(&format!("{prefix}> {text}"));
            }
            OutputFormat::Json => self.emit(ConsoleEvent::message(role, text)),
        }
    }

    fn render_error(&mut self, text: &str) {
        match self.format {
            OutputFormat::Plain => self.write_line(&format!("error: {text}")),
            OutputFormat::Json => self.emit(ConsoleEvent::error(text)),
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        let was_enabled = std::mem::replace(&mut self.input_enabled, enabled);
        match self.format {
            // Stdin is never paused, so announce the gap.
            OutputFormat::Plain if was_enabled && !enabled => {
                self.write_line(INPUT_PAUSED_NOTICE)
            }
            OutputFormat::Plain => {}
            OutputFormat::Json => self.emit(ConsoleEvent::input(enabled)),
        }
    }

    fn set_loading_visible(&mut self, visible: bool) {
        // The status line already says "Connecting..." in plain mode.
        if self.format == OutputFormat::Json {
            self.emit(ConsoleEvent::loading(visible));
        }
    }

    fn set_status_label(&mut self, state: ConnectionState, label: &str) {
        match self.format {
            OutputFormat::Plain => self.write_line(&format!("[{label}]")),
            OutputFormat::Json => self.emit(ConsoleEvent::status(state, label)),
        }
    }
}
