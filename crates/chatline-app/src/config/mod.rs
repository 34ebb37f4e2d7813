//! Configuration file parsing for chatline
//!
//! Supports `<config_dir>/chatline/config.toml` (or an explicit path).

pub mod settings;
pub mod types;

pub use settings::{default_config_path, init_config_file, load_settings};
pub use types::*;
