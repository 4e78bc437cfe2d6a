//! pp-session: Session lifecycle controller for remote playpens
//!
//! A playpen is a throwaway remote execution target that mirrors a locally
//! built artifact. For each invocation the controller either runs a one-shot
//! administrative command (create, delete, exists, get, download) or sets
//! up a live session for the duration of a local dev run and registers a
//! shutdown hook that disconnects, and optionally waits for the remote
//! container to be cleaned up, before the process exits.

pub mod archive;
pub mod controller;
pub mod dispatcher;
pub mod hooks;
pub mod liveness;
pub mod logging;
pub mod orchestrator;
pub mod poll;
pub mod resolve;
pub mod shutdown;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use archive::{ArtifactArchive, BuildArtifact};
pub use controller::{Invocation, PlaypenController};
pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use hooks::ShutdownHooks;
pub use orchestrator::{LiveSessionOrchestrator, LiveSessionOutcome};
pub use shutdown::{ShutdownCoordinator, ShutdownOutcome};
pub use state::SessionGuard;
