//! Message processing: runs the TEA update loop and dispatches actions

use std::sync::Arc;

use tokio::sync::mpsc;

use chatline_transport::{PrimaryTransport, SecondaryTransport};

use crate::actions::{handle_action, TaskHandles};
use crate::handler;
use crate::message::Message;
use crate::render::Renderer;
use crate::state::SessionState;

/// Process a message through the TEA update function, then any follow-ups.
pub fn process_message<P, S, R>(
    state: &mut SessionState,
    message: Message,
    primary: &mut P,
    secondary: Option<&Arc<S>>,
    renderer: &mut R,
    msg_tx: &mpsc::Sender<Message>,
    tasks: &mut TaskHandles,
) where
    P: PrimaryTransport,
    S: SecondaryTransport + Sync + 'static,
    R: Renderer,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m, &*primary, renderer);

        if let Some(action) = result.action {
            handle_action(action, primary, secondary, msg_tx, tasks);
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
