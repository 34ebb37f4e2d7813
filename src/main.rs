//! chatline - terminal chat client with WebSocket-to-HTTP fallback
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;

use chatline::OutputFormat;
use chatline_app::config::{default_config_path, init_config_file, load_settings};
use chatline_app::Settings;
use chatline_core::prelude::*;

/// chatline - chat with a service over WebSocket, falling back to HTTP
#[derive(Parser, Debug)]
#[command(name = "chatline", version)]
#[command(about = "Terminal chat client with WebSocket-to-HTTP fallback", long_about = None)]
struct Args {
    /// Base URL of the chat service (https selects wss)
    #[arg(long, value_name = "BASE")]
    url: Option<String>,

    /// Failed reconnection attempts tolerated before giving up on WebSocket
    #[arg(long, value_name = "N")]
    max_attempts: Option<u32>,

    /// Never fall back to HTTP
    #[arg(long)]
    no_fallback: bool,

    /// Do not send the greeting after connecting
    #[arg(long)]
    no_greeting: bool,

    /// Emit NDJSON events instead of plain text
    #[arg(long)]
    json: bool,

    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    /// CLI flags take precedence over the config file.
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.connection.base_url = url.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            settings.reconnect.max_attempts = max_attempts;
        }
        if self.no_fallback {
            settings.connection.http_fallback = false;
        }
        if self.no_greeting {
            settings.behavior.send_greeting = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;

    let args = Args::parse();

    if let Err(e) = chatline_core::logging::init() {
        eprintln!("warning: logging disabled: {e}");
    }

    let config_path = args.config.clone().or_else(default_config_path);

    if args.init_config {
        let path = config_path.ok_or_else(|| Error::config("no config directory available"))?;
        init_config_file(&path).context("writing default config")?;
        eprintln!("Config file: {}", path.display());
        return Ok(());
    }

    let mut settings = config_path
        .as_deref()
        .map(load_settings)
        .unwrap_or_default();
    args.apply_overrides(&mut settings);

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    };

    let result = chatline::run_console(settings, format).await;
    if let Err(ref e) = result {
        error!("Session error: {:?}", e);
    }
    result
}
