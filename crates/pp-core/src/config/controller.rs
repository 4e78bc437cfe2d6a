//! Controller configuration file

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{default_config_path, load_config, LiveReloadConfig, PollConfig, SessionConfig};
use crate::error::ConfigError;

/// Name of the dev-loop thread the shutdown sequence waits for
pub const DEFAULT_DEV_LOOP_THREAD: &str = "Remote dev client thread";

/// How the one-shot command path maps outcomes to a process exit code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitPolicy {
    /// Always exit 0; failures are only visible in the logs
    #[default]
    AlwaysSuccess,
    /// Exit 1 when the command failed
    ReflectOutcome,
}

/// Complete controller configuration, as stored in `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Playpen target and command options
    pub playpen: SessionConfig,

    /// Ambient live-reload settings
    pub live_reload: LiveReloadConfig,

    /// Shutdown timing policies
    pub poll: PollConfig,

    /// Exit code policy for one-shot commands
    pub exit_policy: ExitPolicy,

    /// Thread name probed when no explicit completion signal is wired up
    pub dev_loop_thread: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            playpen: SessionConfig::default(),
            live_reload: LiveReloadConfig::default(),
            poll: PollConfig::default(),
            exit_policy: ExitPolicy::default(),
            dev_loop_thread: DEFAULT_DEV_LOOP_THREAD.to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map_or_else(default_config_path, Path::to_path_buf);
        match load_config(&path) {
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!("No playpen configuration at {:?}, using defaults", path);
                Ok(Self::default())
            }
            result => result,
        }
    }
}
