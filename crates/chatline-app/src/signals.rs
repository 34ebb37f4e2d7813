//! OS signal handling: a signal ends the session like `/quit` does

use std::future::Future;

use tokio::sync::mpsc;

use chatline_core::prelude::*;

use crate::message::Message;

/// Spawn a task that posts `Message::Shutdown` on SIGINT/SIGTERM
/// (Ctrl+C on Windows).
pub fn spawn_signal_handler(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        if let Err(e) = shutdown_on(wait_for_signal(), &tx).await {
            warn!("Signal handler stopped: {}", e);
        }
    });
}

/// Wait for `signal`, then ask the engine to shut down.
async fn shutdown_on(
    signal: impl Future<Output = Result<&'static str>>,
    tx: &mpsc::Sender<Message>,
) -> Result<()> {
    let name = signal.await?;
    info!("{} received, shutting down", name);
    tx.send(Message::Shutdown)
        .await
        .map_err(|_| Error::ChannelClosed)
}

async fn wait_for_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|e| Error::terminal(format!("cannot watch {name}: {e}")))
        };
        let mut sigint = install(SignalKind::interrupt(), "SIGINT")?;
        let mut sigterm = install(SignalKind::terminate(), "SIGTERM")?;

        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        Ok(name)
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| Error::terminal(format!("cannot watch Ctrl+C: {e}")))?;
        Ok("Ctrl+C")
    }
}
