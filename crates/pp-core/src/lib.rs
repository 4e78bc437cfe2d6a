//! pp-core: Core abstractions and configuration for remote playpens
//!
//! This crate provides the shared configuration structures, error types,
//! and the trait seams (remote client, client factory, dev-loop liveness)
//! used by the session controller.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{PlaypenError, Result};
pub use types::{PlaypenCommand, ResolvedTarget, SessionState};
