//! Per-invocation entry point
//!
//! The controller validates the session configuration, then either runs a
//! one-shot command (and asks the host to exit) or starts the live session
//! and hands control back to the dev loop.

use std::path::Path;
use std::sync::Arc;

use pp_core::config::{ControllerConfig, ExitPolicy, SessionConfig};
use pp_core::error::ConfigError;
use pp_core::traits::{ClientFactory, DevLoopLiveness};

use crate::archive::BuildArtifact;
use crate::dispatcher::CommandDispatcher;
use crate::hooks::ShutdownHooks;
use crate::liveness::NamedThreadProbe;
use crate::orchestrator::{LiveSessionOrchestrator, LiveSessionOutcome};
use crate::resolve::ClientResolver;
use crate::state::SessionGuard;

/// What the host should do after an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Invocation {
    /// A one-shot command ran; the process should exit with this code
    Exit(i32),
    /// Keep running the dev loop
    Continue(LiveSessionOutcome),
}

impl Invocation {
    /// Exit code requested by a one-shot command, if any
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Invocation::Exit(code) => Some(*code),
            Invocation::Continue(_) => None,
        }
    }

    /// Terminate the process if a one-shot command ran.
    ///
    /// Registered shutdown hooks are not run; a one-shot command never
    /// registers any.
    pub fn exit_if_requested(self) -> LiveSessionOutcome {
        match self {
            Invocation::Exit(code) => std::process::exit(code),
            Invocation::Continue(outcome) => outcome,
        }
    }
}

/// Drives the playpen lifecycle for a host process
pub struct PlaypenController {
    dispatcher: CommandDispatcher,
    orchestrator: LiveSessionOrchestrator,
    guard: Arc<SessionGuard>,
    hooks: Arc<ShutdownHooks>,
    exit_policy: ExitPolicy,
}

impl PlaypenController {
    /// Create a controller with an explicit dev-loop liveness source
    pub fn new(
        config: &ControllerConfig,
        factory: Arc<dyn ClientFactory>,
        dev_loop: Arc<dyn DevLoopLiveness>,
    ) -> Self {
        let resolver = Arc::new(ClientResolver::new(config.live_reload.clone(), factory));
        let guard = Arc::new(SessionGuard::new());
        let hooks = Arc::new(ShutdownHooks::new());

        let orchestrator = LiveSessionOrchestrator::new(
            Arc::clone(&resolver),
            Arc::clone(&guard),
            Arc::clone(&hooks),
            dev_loop,
            config.poll.clone(),
        );

        Self {
            dispatcher: CommandDispatcher::new(resolver),
            orchestrator,
            guard,
            hooks,
            exit_policy: config.exit_policy,
        }
    }

    /// Create a controller that tracks the dev loop by its thread name
    pub fn from_config(config: &ControllerConfig, factory: Arc<dyn ClientFactory>) -> Self {
        let probe = NamedThreadProbe::new(config.dev_loop_thread.clone());
        Self::new(config, factory, Arc::new(probe))
    }

    /// Create a controller from a config file, or the default one when `path` is `None`
    pub fn load(
        path: Option<&Path>,
        factory: Arc<dyn ClientFactory>,
    ) -> Result<Self, ConfigError> {
        let config = ControllerConfig::load(path)?;
        Ok(Self::from_config(&config, factory))
    }

    /// Validate a session configuration without touching the remote side
    pub fn check(&self, config: &SessionConfig) -> Result<(), ConfigError> {
        config.validate()
    }

    /// Handle one invocation
    pub async fn invoke(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<Invocation, ConfigError> {
        self.check(config)?;

        if let Some(outcome) = self.dispatcher.dispatch(config, artifact).await {
            tracing::debug!("Playpen command finished: {:?}", outcome);
            return Ok(Invocation::Exit(outcome.exit_code(self.exit_policy)));
        }

        Ok(Invocation::Continue(
            self.orchestrator.start(config, artifact).await,
        ))
    }

    /// Hooks the host must run before exiting
    pub fn shutdown_hooks(&self) -> Arc<ShutdownHooks> {
        Arc::clone(&self.hooks)
    }

    /// Whether a live session has been established
    pub fn is_session_started(&self) -> bool {
        self.guard.is_started()
    }
}
