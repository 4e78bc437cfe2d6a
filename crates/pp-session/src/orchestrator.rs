//! Automatic live-session setup
//!
//! Runs when a remote target is configured and no explicit command was
//! given. Establishes the session once per controller, registers the
//! shutdown sequence and hands control straight back to the dev loop.

use std::sync::Arc;

use pp_core::config::{PollConfig, SessionConfig};
use pp_core::traits::{DevLoopLiveness, RemoteSessionClient};
use pp_core::{PlaypenError, SessionState};

use crate::archive::{ArtifactArchive, BuildArtifact};
use crate::hooks::ShutdownHooks;
use crate::resolve::ClientResolver;
use crate::shutdown::ShutdownCoordinator;
use crate::state::SessionGuard;

/// Name of the registered shutdown hook
pub const SHUTDOWN_HOOK_NAME: &str = "playpen-disconnect";

/// Result of a live-session attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveSessionOutcome {
    /// No remote target, or an explicit command was given
    NotApplicable,
    /// A session was already established (or is being established)
    AlreadyStarted,
    /// No client could be built for the configured target
    Unresolved,
    /// Credential challenge was rejected or could not be performed
    ChallengeFailed,
    /// Provisioning the remote container failed
    CreateFailed,
    /// Connecting to the playpen failed
    ConnectFailed,
    /// Connected after the shutdown hooks had already run, and torn down again
    ShutdownInProgress,
    /// Connected; shutdown hook registered
    Connected {
        /// Whether this process created the container and must wait for its cleanup
        owns_cleanup: bool,
    },
}

impl LiveSessionOutcome {
    /// Whether a session is now established by this call
    pub fn is_connected(&self) -> bool {
        matches!(self, LiveSessionOutcome::Connected { .. })
    }
}

/// Establishes the live session and defers its teardown
pub struct LiveSessionOrchestrator {
    resolver: Arc<ClientResolver>,
    guard: Arc<SessionGuard>,
    hooks: Arc<ShutdownHooks>,
    dev_loop: Arc<dyn DevLoopLiveness>,
    poll: PollConfig,
}

impl LiveSessionOrchestrator {
    /// Create an orchestrator
    pub fn new(
        resolver: Arc<ClientResolver>,
        guard: Arc<SessionGuard>,
        hooks: Arc<ShutdownHooks>,
        dev_loop: Arc<dyn DevLoopLiveness>,
        poll: PollConfig,
    ) -> Self {
        Self {
            resolver,
            guard,
            hooks,
            dev_loop,
            poll,
        }
    }

    /// Start the live session if this invocation calls for one
    pub async fn start(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> LiveSessionOutcome {
        if config.remote.is_none() || config.command.is_some() {
            return LiveSessionOutcome::NotApplicable;
        }

        let Some(attempt) = self.guard.try_begin() else {
            tracing::debug!("Playpen session already established, nothing to do");
            return LiveSessionOutcome::AlreadyStarted;
        };

        let (client, owns_cleanup) = match self.establish(config, artifact).await {
            Ok(established) => established,
            Err(outcome) => return outcome,
        };

        attempt.complete();

        let coordinator = ShutdownCoordinator::new(
            client,
            owns_cleanup,
            Arc::clone(&self.dev_loop),
            self.poll.clone(),
        );
        if !self
            .hooks
            .register(SHUTDOWN_HOOK_NAME, coordinator.clone().run_to_completion())
        {
            // The guard stays Connected so no new session starts while exiting
            tracing::error!("Connected to playpen during shutdown, disconnecting immediately");
            coordinator.run_to_completion().await;
            return LiveSessionOutcome::ShutdownInProgress;
        }

        LiveSessionOutcome::Connected { owns_cleanup }
    }

    /// Challenge, provision if needed, and connect.
    ///
    /// On success returns the client and whether this process owns cleanup.
    async fn establish(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<(Arc<dyn RemoteSessionClient>, bool), LiveSessionOutcome> {
        let client = self
            .resolver
            .client(config)
            .ok_or(LiveSessionOutcome::Unresolved)?;

        match client.challenge().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("{}, not starting playpen session", PlaypenError::Authentication);
                return Err(LiveSessionOutcome::ChallengeFailed);
            }
            Err(e) => {
                tracing::error!("Failed to verify playpen credentials: {}", e);
                return Err(LiveSessionOutcome::ChallengeFailed);
            }
        }

        let mut owns_cleanup = false;
        if !client.is_existing_host_target() {
            owns_cleanup = self.provision(client.as_ref(), artifact).await?;
        }

        tracing::info!("Connecting to playpen");
        match client.connect(owns_cleanup).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("Failed to connect to playpen");
                return Err(LiveSessionOutcome::ConnectFailed);
            }
            Err(e) => {
                tracing::error!("Failed to connect to playpen: {}", e);
                return Err(LiveSessionOutcome::ConnectFailed);
            }
        }

        tracing::info!("Connected to playpen!");
        tracing::debug!("Remote playpen state: {}", SessionState::ExistsConnected);
        Ok((client, owns_cleanup))
    }

    /// Create the remote container unless it already exists.
    ///
    /// Returns whether this process created it.
    async fn provision(
        &self,
        client: &dyn RemoteSessionClient,
        artifact: &BuildArtifact,
    ) -> Result<bool, LiveSessionOutcome> {
        let exists = client.exists().await.map_err(|e| {
            tracing::error!("Failed to check for remote playpen container: {}", e);
            LiveSessionOutcome::CreateFailed
        })?;
        tracing::debug!("Remote playpen state: {}", SessionState::from_exists(exists));

        if exists {
            tracing::info!("Remote playpen container already exists, not creating for session.");
            return Ok(false);
        }

        tracing::info!("Creating remote playpen container.  This may take awhile...");
        let archive = ArtifactArchive::build(artifact).await.map_err(|e| {
            tracing::error!("Failed to package build output for remote playpen: {}", e);
            LiveSessionOutcome::CreateFailed
        })?;

        match client.create(archive.path(), false).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::error!("Failed to create remote playpen container.");
                Err(LiveSessionOutcome::CreateFailed)
            }
            Err(e) => {
                tracing::error!("Failed to create remote playpen container: {}", e);
                Err(LiveSessionOutcome::CreateFailed)
            }
        }
    }
}
