//! Primary transport lifecycle: connect, loss, reconnection, fallback

use chatline_core::{AttemptId, ConnectionState, MessageEnvelope, TransportMode};
use chatline_transport::{PrimaryEvent, PrimaryEventKind, PrimaryTransport};
use tracing::{debug, info, warn};

use crate::policy::Decision;
use crate::render::Renderer;
use crate::state::SessionState;

use super::{dispatch, UpdateAction, UpdateResult, CONNECTION_LOST_MESSAGE, UNREACHABLE_MESSAGE};

/// Idle → Connecting
pub(crate) fn handle_start(state: &mut SessionState, ui: &mut dyn Renderer) -> UpdateResult {
    if state.connection != ConnectionState::Idle {
        debug!("Start ignored in state {}", state.connection);
        return UpdateResult::none();
    }
    begin_connect(state, ui)
}

/// Route one primary event, dropping anything from a superseded attempt.
pub(crate) fn handle_primary_event(
    state: &mut SessionState,
    event: PrimaryEvent,
    primary: &dyn PrimaryTransport,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    if state.mode == TransportMode::Secondary {
        debug!(
            "Ignoring primary event from attempt {} after fallback",
            event.attempt
        );
        return UpdateResult::none();
    }
    if event.attempt != state.attempt {
        debug!(
            "Ignoring stale primary event from attempt {} (current {})",
            event.attempt, state.attempt
        );
        return UpdateResult::none();
    }

    match event.kind {
        PrimaryEventKind::Opened => handle_opened(state, primary, ui),
        PrimaryEventKind::Closed => handle_link_lost(state, ui, "closed by peer"),
        PrimaryEventKind::Error(reason) => handle_link_lost(state, ui, &reason),
        PrimaryEventKind::Frame(raw) => {
            if state.connection != ConnectionState::Connected {
                debug!("Dropping frame received in state {}", state.connection);
                return UpdateResult::none();
            }
            dispatch::handle_inbound_frame(state, &raw, ui)
        }
    }
}

/// Disconnected → Connecting, when the armed retry fires.
pub(crate) fn handle_retry_elapsed(
    state: &mut SessionState,
    attempt: AttemptId,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    if state.pending_retry != Some(attempt)
        || state.connection != ConnectionState::Disconnected
        || state.mode == TransportMode::Secondary
    {
        debug!("Ignoring stale retry timer for attempt {}", attempt);
        return UpdateResult::none();
    }

    state.pending_retry = None;
    begin_connect(state, ui)
}

fn begin_connect(state: &mut SessionState, ui: &mut dyn Renderer) -> UpdateResult {
    let attempt = state.next_attempt();
    state.connection = ConnectionState::Connecting;

    ui.set_loading_visible(true);
    ui.set_input_enabled(false);
    show_status(state, ui);

    UpdateResult::action(UpdateAction::OpenPrimary { attempt })
}

/// Connecting → Connected
fn handle_opened(
    state: &mut SessionState,
    primary: &dyn PrimaryTransport,
    ui: &mut dyn Renderer,
) -> UpdateResult {
    if state.connection != ConnectionState::Connecting {
        debug!("Ignoring duplicate open in state {}", state.connection);
        return UpdateResult::none();
    }

    info!("Primary transport connected (attempt {})", state.attempt);
    state.connection = ConnectionState::Connected;
    state.reconnect_attempts = 0;
    state.mode = TransportMode::Primary;

    ui.set_loading_visible(false);
    show_status(state, ui);
    ui.set_input_enabled(!state.in_flight);

    if let Some(greeting) = &state.greeting {
        if let Err(err) = primary.send(&MessageEnvelope::message(greeting.as_str())) {
            warn!("Failed to send greeting: {}", err);
        }
    }

    UpdateResult::none()
}

/// Connecting/Connected → Disconnected, then retry or give up.
fn handle_link_lost(state: &mut SessionState, ui: &mut dyn Renderer, reason: &str) -> UpdateResult {
    if !matches!(
        state.connection,
        ConnectionState::Connecting | ConnectionState::Connected
    ) {
        debug!("Ignoring link loss in state {}: {}", state.connection, reason);
        return UpdateResult::none();
    }

    warn!(
        "Primary transport lost (attempt {}): {}",
        state.attempt, reason
    );
    state.connection = ConnectionState::Disconnected;
    ui.set_input_enabled(false);

    // The reply to an outstanding message can no longer arrive.
    if state.in_flight {
        state.in_flight = false;
        ui.render_error(CONNECTION_LOST_MESSAGE);
    }

    match state.policy.decide(state.reconnect_attempts) {
        Decision::Retry { attempt, delay } => {
            state.reconnect_attempts = attempt;
            state.pending_retry = Some(state.attempt);
            show_status(state, ui);
            info!(
                "Reconnecting in {:?} (attempt {}/{})",
                delay,
                attempt,
                state.policy.max_attempts()
            );
            UpdateResult::action(UpdateAction::ScheduleRetry {
                attempt: state.attempt,
                delay,
            })
        }
        Decision::Exhausted => handle_exhausted(state, ui),
    }
}

/// Disconnected → Fallback, or permanently Disconnected without one.
fn handle_exhausted(state: &mut SessionState, ui: &mut dyn Renderer) -> UpdateResult {
    state.pending_retry = None;
    ui.set_loading_visible(false);

    if state.fallback_available {
        info!(
            "Reconnection exhausted after {} attempts, switching to HTTP fallback",
            state.reconnect_attempts
        );
        state.connection = ConnectionState::Fallback;
        state.mode = TransportMode::Secondary;
        show_status(state, ui);
        ui.set_input_enabled(true);
    } else {
        warn!(
            "Reconnection exhausted after {} attempts and no fallback is configured",
            state.reconnect_attempts
        );
        state.exhausted = true;
        show_status(state, ui);
        ui.render_error(UNREACHABLE_MESSAGE);
    }

    UpdateResult::action(UpdateAction::ClosePrimary)
}

fn show_status(state: &SessionState, ui: &mut dyn Renderer) {
    let label = if state.exhausted {
        "Disconnected"
    } else {
        state.connection.label()
    };
    ui.set_status_label(state.connection, label);
}
