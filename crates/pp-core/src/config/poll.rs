//! Polling policy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// Exponential backoff used while waiting for the dev loop to quiesce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Maximum number of sleeps before giving up
    pub max_iterations: u32,

    /// First delay
    #[serde(rename = "initial_ms", with = "duration_millis")]
    pub initial: Duration,

    /// Growth factor applied after each sleep
    pub multiplier: u32,

    /// Delay stops growing once it reaches this value
    #[serde(rename = "cap_ms", with = "duration_millis")]
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            initial: Duration::from_millis(10),
            multiplier: 10,
            cap: Duration::from_millis(1000),
        }
    }
}

/// Fixed-interval polling used while waiting for remote teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedIntervalPolicy {
    /// Maximum number of sleeps before giving up
    pub max_iterations: u32,

    /// Delay between checks
    #[serde(rename = "interval_ms", with = "duration_millis")]
    pub interval: Duration,
}

impl Default for FixedIntervalPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            interval: Duration::from_millis(2000),
        }
    }
}

/// All timing constants of the shutdown sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Wait for the dev loop to finish its own shutdown
    pub dev_loop_wait: BackoffPolicy,

    /// Pause between the dev-loop wait and disconnect
    #[serde(rename = "grace_period_ms", with = "duration_millis")]
    pub grace_period: Duration,

    /// Wait for the remote container to disappear after disconnect
    pub cleanup_wait: FixedIntervalPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            dev_loop_wait: BackoffPolicy::default(),
            grace_period: Duration::from_millis(10),
            cleanup_wait: FixedIntervalPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.dev_loop_wait.max_iterations, 30);
        assert_eq!(config.dev_loop_wait.initial, Duration::from_millis(10));
        assert_eq!(config.dev_loop_wait.cap, Duration::from_millis(1000));
        assert_eq!(config.grace_period, Duration::from_millis(10));
        // Remote teardown gets up to one minute
        let cleanup = &config.cleanup_wait;
        assert_eq!(cleanup.interval * cleanup.max_iterations, Duration::from_secs(60));
    }

    #[test]
    fn test_partial_override() {
        let config: PollConfig = toml::from_str(
            r#"
grace_period_ms = 50

[dev_loop_wait]
max_iterations = 3
"#,
        )
        .unwrap();
        assert_eq!(config.grace_period, Duration::from_millis(50));
        assert_eq!(config.dev_loop_wait.max_iterations, 3);
        assert_eq!(config.dev_loop_wait.initial, Duration::from_millis(10));
        assert_eq!(config.cleanup_wait, FixedIntervalPolicy::default());
    }
}
