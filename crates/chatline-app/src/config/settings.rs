//! Settings parser for `config.toml`

use std::path::{Path, PathBuf};

use super::types::Settings;
use chatline_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const CHATLINE_DIR: &str = "chatline";

/// Default location of the settings file: `<config_dir>/chatline/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CHATLINE_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `config_path`, falling back to defaults.
///
/// A missing file is normal. An unreadable or malformed file is logged and
/// ignored; configuration problems never stop a session from starting.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write a commented default `config.toml` at `config_path` unless one exists.
pub fn init_config_file(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Ok(());
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create {}: {}", dir.display(), e)))?;
    }

    let default_content = r#"# chatline configuration

[connection]
base_url = "http://localhost:8000"   # https selects wss for the WebSocket
ws_path = "/ws/chat"
http_path = "/api/chat"
http_fallback = true                 # Use HTTP once WebSocket retries are exhausted
request_timeout_ms = 30000

[reconnect]
max_attempts = 3                     # Failed reconnects before giving up on WebSocket
base_delay_ms = 1000                 # Attempt n waits base * 2^n ...
max_delay_ms = 10000                 # ... capped here

[behavior]
send_greeting = true                 # Handshake message after every connect
greeting = "greeting"
"#;
    std::fs::write(config_path, default_content)
        .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;

    info!("Wrote default settings to {:?}", config_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(&dir.path().join("config.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[connection]
base_url = "https://chat.example.com"
http_fallback = false

[behavior]
send_greeting = false
"#,
        )
        .unwrap();

        let settings = load_settings(&path);

        assert_eq!(settings.connection.base_url, "https://chat.example.com");
        assert!(!settings.connection.http_fallback);
        assert!(!settings.behavior.send_greeting);
        assert_eq!(settings.reconnect.max_attempts, 3);
    }

    #[test]
    fn test_load_malformed_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[connection\nbase_url = ").unwrap();

        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_init_config_file_round_trips_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config_file(&path).unwrap();

        assert!(path.exists());
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_init_config_file_keeps_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reconnect]\nmax_attempts = 9\n").unwrap();

        init_config_file(&path).unwrap();

        assert_eq!(load_settings(&path).reconnect.max_attempts, 9);
    }
}
