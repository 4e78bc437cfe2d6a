//! Core error types for remote playpens

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the playpen crates
pub type Result<T> = std::result::Result<T, PlaypenError>;

/// Top-level error type for the playpen controller
#[derive(Error, Debug)]
pub enum PlaypenError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential challenge was rejected
    #[error("Authentication failed: credential challenge rejected")]
    Authentication,

    /// Remote operation error
    #[error("Remote operation error: {0}")]
    Remote(#[from] RemoteError),

    /// Archive packaging error
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Both a remote and a local target were configured
    #[error("Must pick either a local or a remote playpen target, not both")]
    ConflictingTargets,

    /// Remote target is only a query suffix and no live-reload URL is set
    #[error("Remote playpen target '{0}' is not a full URI and no live-reload URL is configured")]
    MissingBaseUrl(String),

    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The remote client call an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    Exists,
    FetchAddress,
    Create,
    Delete,
    Challenge,
    Connect,
    Disconnect,
    Download,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteOperation::Exists => "existence check",
            RemoteOperation::FetchAddress => "address lookup",
            RemoteOperation::Create => "create",
            RemoteOperation::Delete => "delete",
            RemoteOperation::Challenge => "credential challenge",
            RemoteOperation::Connect => "connect",
            RemoteOperation::Disconnect => "disconnect",
            RemoteOperation::Download => "download",
        };
        f.write_str(name)
    }
}

/// Errors reported by a remote session client
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The remote side answered but refused the operation
    #[error("{operation} was rejected by the remote playpen")]
    Rejected {
        /// Operation that was refused
        operation: RemoteOperation,
    },

    /// The call itself failed (network, protocol, local I/O)
    #[error("{operation} failed: {message}")]
    Transport {
        /// Operation that failed
        operation: RemoteOperation,
        /// Human-readable cause
        message: String,
    },
}

impl RemoteError {
    /// Create a transport error for an operation
    pub fn transport(operation: RemoteOperation, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }
}

/// Errors while packaging the build output into an upload archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The artifact path has no enclosing output directory
    #[error("Artifact {0:?} has no parent output directory")]
    MissingParent(PathBuf),

    /// Zip writer failure
    #[error("Zip error: {0}")]
    Zip(String),

    /// I/O error while walking or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
