//! Core domain types

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::Secret;

/// One-shot administrative command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaypenCommand {
    /// Create without an existence precheck
    CreateManual,
    /// Create if absent, then report the assigned address
    Create,
    /// Delete the remote playpen
    Delete,
    /// Report whether the remote playpen exists
    Exists,
    /// Report the remote playpen address
    Get,
    /// Download the remote archive next to the build output
    Download,
}

impl PlaypenCommand {
    /// All commands, in dispatch-table order
    pub const ALL: [PlaypenCommand; 6] = [
        PlaypenCommand::CreateManual,
        PlaypenCommand::Create,
        PlaypenCommand::Delete,
        PlaypenCommand::Exists,
        PlaypenCommand::Get,
        PlaypenCommand::Download,
    ];

    /// Canonical command name
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaypenCommand::CreateManual => "remote-create-manual",
            PlaypenCommand::Create => "remote-create",
            PlaypenCommand::Delete => "remote-delete",
            PlaypenCommand::Exists => "remote-exists",
            PlaypenCommand::Get => "remote-get",
            PlaypenCommand::Download => "remote-download",
        }
    }
}

impl fmt::Display for PlaypenCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command name that matches no known command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown remote playpen command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for PlaypenCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Logical state of the remote playpen, as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No remote container exists
    NonExistent,
    /// A container exists but this process is not connected to it
    ExistsUnconnected,
    /// A container exists and this process holds a live connection
    ExistsConnected,
}

impl SessionState {
    /// State implied by an existence check, before any connect
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            SessionState::ExistsUnconnected
        } else {
            SessionState::NonExistent
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NonExistent => write!(f, "non-existent"),
            SessionState::ExistsUnconnected => write!(f, "exists (unconnected)"),
            SessionState::ExistsConnected => write!(f, "exists (connected)"),
        }
    }
}

/// Connection parameters a remote client is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Base URL of the control plane
    pub base_url: String,
    /// Credentials, if any were configured
    pub credentials: Option<Secret>,
    /// Query string selecting the playpen (without the leading `?`)
    pub query_string: String,
}
