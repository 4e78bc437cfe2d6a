//! Configuration management for remote playpens

mod controller;
mod poll;
pub mod serde_utils;
mod session;

pub use controller::{ControllerConfig, ExitPolicy, DEFAULT_DEV_LOOP_THREAD};
pub use poll::{BackoffPolicy, FixedIntervalPolicy, PollConfig};
pub use session::{LiveReloadConfig, Secret, SessionConfig};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Default location of the controller config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playpen")
        .join("config.toml")
}

/// Load a TOML configuration file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Invalid(format!("Failed to read {:?}: {}", path, e)),
    })?;

    let config: T = toml::from_str(&content)?;
    tracing::debug!("Loaded playpen configuration from {:?}", path);
    Ok(config)
}
