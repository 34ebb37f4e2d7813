//! Dispatch contract: one outstanding user message at a time

use chatline_core::{MessageEnvelope, Role, TransportMode};
use chatline_transport::PrimaryTransport;
use tracing::warn;

use crate::render::Renderer;
use crate::state::SessionState;

use super::{
    UpdateAction, UpdateResult, DECODE_FAILED_MESSAGE, REQUEST_FAILED_MESSAGE,
    SEND_FAILED_MESSAGE,
};

/// Submit the input buffer through the current transport.
pub(crate) fn handle_submit(
    state: &mut SessionState,
    primary: &dyn PrimaryTransport,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    let text = state.input.trim().to_string();
    if text.is_empty() {
        return UpdateResult::none();
    }
    if !state.can_submit() {
        if state.in_flight {
            warn!("Submit dropped: a reply is still pending ({} chars)", text.len());
        } else {
            warn!(
                "Submit dropped: connection is {} ({} chars)",
                state.connection,
                text.len()
            );
        }
        return UpdateResult::none();
    }

    state.input.clear();
    state.in_flight = true;
    ui.render_message(Role::User, &text);
    ui.set_input_enabled(false);

    let envelope = MessageEnvelope::message(text);
    match state.mode {
        TransportMode::Primary => {
            if let Err(err) = primary.send(&envelope) {
                warn!("Send failed: {}", err);
                fail_turn(state, ui, SEND_FAILED_MESSAGE);
            }
            UpdateResult::none()
        }
        TransportMode::Secondary => UpdateResult::action(UpdateAction::SendSecondary { envelope }),
    }
}

/// Decode and handle one frame from the primary transport.
pub(crate) fn handle_inbound_frame(
    state: &mut SessionState,
    raw: &str,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    match MessageEnvelope::decode(raw) {
        Ok(envelope) => handle_envelope(state, envelope, ui),
        Err(err) => {
            warn!("Failed to decode inbound frame: {}", err);
            ui.render_error(DECODE_FAILED_MESSAGE);
            UpdateResult::none()
        }
    }
}

/// Handle the outcome of a secondary request.
pub(crate) fn handle_secondary_completed(
    state: &mut SessionState,
    result: Result<MessageEnvelope, String>,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    match result {
        Ok(envelope) => handle_envelope(state, envelope, ui),
        Err(reason) => {
            warn!("Secondary request failed: {}", reason);
            fail_turn(state, ui, REQUEST_FAILED_MESSAGE);
            UpdateResult::none()
        }
    }
}

/// Any inbound envelope completes the current turn.
fn handle_envelope(
    state: &mut SessionState,
    envelope: MessageEnvelope,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    state.in_flight = false;
    if envelope.is_error() {
        ui.render_error(&envelope.content);
    } else {
        ui.render_message(Role::Assistant, &envelope.content);
    }
    ui.set_input_enabled(state.connection.accepts_input());
    UpdateResult::none()
}

fn fail_turn(state: &mut SessionState, ui: &mut dyn Renderer, text: &str) {
    state.in_flight = false;
    ui.render_error(text);
    ui.set_input_enabled(state.connection.accepts_input());
}
