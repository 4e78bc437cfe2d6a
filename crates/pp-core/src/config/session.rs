//! Per-invocation session configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::types::{PlaypenCommand, UnknownCommand};

/// A credential string that never shows up in debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw credential
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Playpen options for a single invocation.
///
/// Parsed once and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Remote target: a full URI, or a query suffix for the live-reload URL
    pub remote: Option<String>,

    /// Local target (mutually exclusive with `remote`)
    pub local: Option<String>,

    /// One-shot command to run instead of a live session
    pub command: Option<String>,

    /// Credentials; the live-reload password is used when absent
    pub credentials: Option<Secret>,
}

impl SessionConfig {
    /// Configuration with only a remote target
    pub fn remote(target: impl Into<String>) -> Self {
        Self {
            remote: Some(target.into()),
            ..Default::default()
        }
    }

    /// Set the one-shot command
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Parse the one-shot command, `None` when no command was given
    pub fn explicit_command(&self) -> Option<Result<PlaypenCommand, UnknownCommand>> {
        self.command.as_deref().map(str::parse)
    }

    /// Check invariants that must hold before any remote interaction
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.is_some() && self.local.is_some() {
            return Err(ConfigError::ConflictingTargets);
        }
        Ok(())
    }
}

/// Settings borrowed from the surrounding live-reload configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Base URL of the live-reload endpoint
    pub url: Option<String>,

    /// Live-reload password, used when no playpen credentials are set
    pub password: Option<Secret>,
}
