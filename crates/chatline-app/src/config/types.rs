//! Configuration types for chatline
//!
//! Defines:
//! - `Settings` - Root of `config.toml`
//! - `ConnectionSettings`, `ReconnectSettings`, `BehaviorSettings` - Its sections

use serde::{Deserialize, Serialize};

/// Application settings (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub reconnect: ReconnectSettings,

    #[serde(default)]
    pub behavior: BehaviorSettings,
}

/// Where and how to reach the chat service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Origin of the service; `https` selects `wss` for the primary transport
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the WebSocket endpoint
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Path of the HTTP endpoint
    #[serde(default = "default_http_path")]
    pub http_path: String,

    /// Fall back to HTTP once WebSocket reconnection is exhausted
    #[serde(default = "default_true")]
    pub http_fallback: bool,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_path: default_ws_path(),
            http_path: default_http_path(),
            http_fallback: true,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Reconnection backoff
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReconnectSettings {
    /// Failed reconnection attempts tolerated before giving up on WebSocket
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base; attempt `n` waits `base_delay_ms * 2^n`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff cap
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Behavior settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BehaviorSettings {
    /// Send a handshake message after every WebSocket connect
    #[serde(default = "default_true")]
    pub send_greeting: bool,

    /// Content of the handshake message
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            send_greeting: true,
            greeting: default_greeting(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_path() -> String {
    chatline_transport::DEFAULT_WS_PATH.to_string()
}

fn default_http_path() -> String {
    chatline_transport::DEFAULT_HTTP_PATH.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    crate::policy::DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_greeting() -> String {
    chatline_core::GREETING_CONTENT.to_string()
}
