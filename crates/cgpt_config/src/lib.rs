//! Credential/config storage for the `cgpt` CLI.
//!
//! Stores the API key and optional defaults in a TOML file at the
//! platform-appropriate config directory, written atomically with
//! best-effort restrictive permissions on Unix. Loading never fails:
//! missing, unreadable, or malformed files degrade to defaults, with
//! malformed files quarantined for debugging.

mod error;
mod paths;
mod store;

pub use error::ConfigError;
pub use paths::{config_dir, config_path, APP_NAME, CONFIG_FILE};
pub use store::{
    load_config, load_config_from, resolve_api_key, resolve_base_url, save_config,
    save_config_to, update_config, Config,
};
