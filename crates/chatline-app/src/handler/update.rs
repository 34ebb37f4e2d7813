//! Main update function - handles state transitions (TEA pattern)

use chatline_transport::PrimaryTransport;
use tracing::info;

use crate::message::Message;
use crate::render::Renderer;
use crate::state::SessionState;

use super::{connection, dispatch, UpdateAction, UpdateResult};

/// Process a message and update state
///
/// `primary` is borrowed so sends can fail synchronously inside the
/// transition; opening and closing are returned as actions.
pub fn update(
    state: &mut SessionState,
    message: Message,
    primary: &dyn PrimaryTransport,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    match message {
        Message::Start => connection::handle_start(state, ui),

        Message::Primary(event) => connection::handle_primary_event(state, event, primary, ui),

        Message::RetryElapsed { attempt } => connection::handle_retry_elapsed(state, attempt, ui),

        // ─────────────────────────────────────────────────────────
        // Dispatch Messages
        // ─────────────────────────────────────────────────────────
        Message::InputChanged(text) => {
            state.input = text;
            UpdateResult::none()
        }

        Message::Submit => dispatch::handle_submit(state, primary, ui),

        Message::SecondaryCompleted { result } => {
            dispatch::handle_secondary_completed(state, result, ui)
        }

        Message::Shutdown => {
            info!("Session shutting down");
            state.request_quit();
            state.pending_retry = None;
            UpdateResult::action(UpdateAction::ClosePrimary)
        }
    }
}
