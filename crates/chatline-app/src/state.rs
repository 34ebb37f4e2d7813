//! Session state (Model in TEA pattern)

use chatline_core::{AttemptId, ConnectionState, TransportMode};

use crate::config::Settings;
use crate::policy::ReconnectPolicy;

/// State owned exclusively by the session state machine.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current lifecycle state
    pub connection: ConnectionState,

    /// Transport carrying outbound envelopes; never returns to `Primary`
    /// once `Secondary`
    pub mode: TransportMode,

    /// Failed reconnection attempts since the last successful open
    pub reconnect_attempts: u32,

    /// A user message is awaiting its terminal response
    pub in_flight: bool,

    /// Text the user is composing
    pub input: String,

    /// Id of the most recent primary `open()`; 0 before the first
    pub attempt: AttemptId,

    /// Attempt id a retry timer is armed for
    pub pending_retry: Option<AttemptId>,

    /// Reconnection gave up and no fallback was available
    pub exhausted: bool,

    /// A secondary transport is configured
    pub fallback_available: bool,

    /// Handshake content sent after every primary open, if enabled
    pub greeting: Option<String>,

    pub policy: ReconnectPolicy,

    quitting: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// State with default policy, fallback enabled, and the default greeting.
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        let greeting = settings
            .behavior
            .send_greeting
            .then(|| settings.behavior.greeting.clone());

        Self {
            connection: ConnectionState::Idle,
            mode: TransportMode::Primary,
            reconnect_attempts: 0,
            in_flight: false,
            input: String::new(),
            attempt: 0,
            pending_retry: None,
            exhausted: false,
            fallback_available: settings.connection.http_fallback,
            greeting,
            policy: ReconnectPolicy::from_settings(&settings.reconnect),
            quitting: false,
        }
    }

    /// Allocate the id for the next primary `open()`.
    pub fn next_attempt(&mut self) -> AttemptId {
        self.attempt += 1;
        self.attempt
    }

    /// Whether new user input can be accepted right now.
    pub fn can_submit(&self) -> bool {
        !self.in_flight && self.connection.accepts_input()
    }

    pub fn request_quit(&mut self) {
        self.quitting = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }
}
