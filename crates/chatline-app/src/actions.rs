//! Action handlers: UpdateAction dispatch and background task spawning

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use chatline_core::{AttemptId, MessageEnvelope};
use chatline_transport::{PrimaryTransport, SecondaryTransport};

use crate::message::Message;
use crate::UpdateAction;

/// Background tasks spawned on behalf of the session.
#[derive(Debug, Default)]
pub struct TaskHandles {
    retry: Option<JoinHandle<()>>,
    request: Option<JoinHandle<()>>,
}

impl TaskHandles {
    pub fn abort_all(&mut self) {
        if let Some(task) = self.retry.take() {
            task.abort();
        }
        if let Some(task) = self.request.take() {
            task.abort();
        }
    }
}

/// Execute an action against the transports, spawning tasks where it waits.
pub fn handle_action<P, S>(
    action: UpdateAction,
    primary: &mut P,
    secondary: Option<&Arc<S>>,
    msg_tx: &mpsc::Sender<Message>,
    tasks: &mut TaskHandles,
) where
    P: PrimaryTransport,
    S: SecondaryTransport + Sync + 'static,
{
    match action {
        UpdateAction::OpenPrimary { attempt } => primary.open(attempt),

        UpdateAction::ClosePrimary => primary.close(),

        UpdateAction::ScheduleRetry { attempt, delay } => {
            // At most one timer is armed at a time.
            if let Some(previous) = tasks.retry.take() {
                previous.abort();
            }
            tasks.retry = Some(spawn_retry_timer(attempt, delay, msg_tx.clone()));
        }

        UpdateAction::SendSecondary { envelope } => match secondary {
            Some(transport) => {
                tasks.request = Some(spawn_secondary_request(
                    Arc::clone(transport),
                    envelope,
                    msg_tx.clone(),
                ));
            }
            None => {
                warn!("SendSecondary requested but no secondary transport is configured");
                let _ = msg_tx.try_send(Message::SecondaryCompleted {
                    result: Err("no secondary transport configured".to_string()),
                });
            }
        },
    }
}

fn spawn_retry_timer(
    attempt: AttemptId,
    delay: Duration,
    msg_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        debug!("Retry timer for attempt {} elapsed", attempt);
        let _ = msg_tx.send(Message::RetryElapsed { attempt }).await;
    })
}

fn spawn_secondary_request<S>(
    transport: Arc<S>,
    envelope: MessageEnvelope,
    msg_tx: mpsc::Sender<Message>,
) -> JoinHandle<()>
where
    S: SecondaryTransport + Sync + 'static,
{
    tokio::spawn(async move {
        let result = transport.request(&envelope).await.map_err(|err| {
            if err.is_recoverable() {
                debug!("Secondary request failed: {}", err);
            } else {
                error!("Secondary request failed permanently: {}", err);
            }
            err.to_string()
        });
        let _ = msg_tx.send(Message::SecondaryCompleted { result }).await;
    })
}
