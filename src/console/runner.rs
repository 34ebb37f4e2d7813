//! Console runner - wires transports, engine, and stdin together
//!
//! Stdin is read on a dedicated OS thread and forwarded into the engine's
//! message channel; the engine itself runs on the tokio runtime.

use std::io::BufRead;
use std::time::Duration;

use tokio::sync::mpsc;

use chatline_app::{signals, Engine, Message, SessionState, Settings};
use chatline_core::prelude::*;
use chatline_transport::{
    resolve_endpoints, HttpTransport, WsTransport, EVENT_CHANNEL_CAPACITY,
};

use super::{ConsoleRenderer, OutputFormat};

/// Line that ends the session.
pub const QUIT_COMMAND: &str = "/quit";

/// Run one interactive chat session until `/quit`, EOF, or a signal.
pub async fn run_console(settings: Settings, format: OutputFormat) -> Result<()> {
    let endpoints = resolve_endpoints(
        &settings.connection.base_url,
        &settings.connection.ws_path,
        &settings.connection.http_path,
    )?;

    info!(
        "Session starting: ws={} http={}",
        endpoints.primary, endpoints.secondary
    );

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let primary = WsTransport::new(endpoints.primary, events_tx);

    let secondary = if settings.connection.http_fallback {
        let timeout = Duration::from_millis(settings.connection.request_timeout_ms);
        Some(HttpTransport::new(endpoints.secondary, timeout)?)
    } else {
        info!("HTTP fallback disabled");
        None
    };

    let mut engine = Engine::new(
        SessionState::with_settings(&settings),
        primary,
        events_rx,
        secondary,
        ConsoleRenderer::stdout(format),
    );

    signals::spawn_signal_handler(engine.msg_sender());

    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        read_input_lines(stdin.lock(), stdin_tx);
    });

    engine.run().await;

    info!("chatline session exiting");
    Ok(())
}

/// Forward input lines into the message channel (blocking).
///
/// Each non-command line is submitted as one chat message; `/quit` or EOF
/// ends the session.
pub fn read_input_lines(reader: impl BufRead, msg_tx: mpsc::Sender<Message>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim() == QUIT_COMMAND {
            info!("Stdin: quit requested");
            break;
        }

        for msg in Message::submit_text(line) {
            if msg_tx.blocking_send(msg).is_err() {
                debug!("Stdin reader: engine gone");
                return;
            }
        }
    }

    let _ = msg_tx.blocking_send(Message::Shutdown);
    info!("Stdin reader exiting");
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn collect(input: &str) -> Vec<Message> {
        let (tx, mut rx) = mpsc::channel(64);
        read_input_lines(Cursor::new(input.to_string()), tx);

        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    #[test]
    fn test_lines_become_submissions() {
        let messages = collect("hello\nhow are you?\n");

        assert_eq!(messages.len(), 5);
        assert!(matches!(&messages[0], Message::InputChanged(text) if text == "hello"));
        assert!(matches!(messages[1], Message::Submit));
        assert!(matches!(&messages[2], Message::InputChanged(text) if text == "how are you?"));
        assert!(matches!(messages[3], Message::Submit));
        assert!(matches!(messages[4], Message::Shutdown));
    }

    #[test]
    fn test_quit_command_stops_reading() {
        let messages = collect("first\n  /quit  \nnever sent\n");

        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[2], Message::Shutdown));
    }

    #[test]
    fn test_eof_shuts_down() {
        let messages = collect("");

        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], Message::Shutdown));
    }
}
