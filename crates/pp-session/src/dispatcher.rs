//! One-shot administrative commands
//!
//! When a command is configured the controller runs it to completion and
//! the process exits afterwards; failures are reported through the logs.

use std::sync::Arc;

use pp_core::config::{ExitPolicy, SessionConfig};
use pp_core::{PlaypenCommand, Result};

use crate::archive::{ArtifactArchive, BuildArtifact};
use crate::resolve::ClientResolver;

/// Result of a one-shot command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command did what was asked
    Succeeded,
    /// Nothing to do (e.g. create when the playpen already exists)
    Skipped,
    /// The remote side refused or a call failed
    Failed,
    /// No client could be built for the configured target
    Unresolved,
    /// The command name was not recognized
    Unknown,
}

impl CommandOutcome {
    /// Whether the outcome counts as a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CommandOutcome::Failed | CommandOutcome::Unresolved | CommandOutcome::Unknown
        )
    }

    /// Process exit code under the given policy
    pub fn exit_code(&self, policy: ExitPolicy) -> i32 {
        match policy {
            ExitPolicy::AlwaysSuccess => 0,
            ExitPolicy::ReflectOutcome if self.is_failure() => 1,
            ExitPolicy::ReflectOutcome => 0,
        }
    }
}

/// Executes explicit playpen commands
pub struct CommandDispatcher {
    resolver: Arc<ClientResolver>,
}

impl CommandDispatcher {
    /// Create a dispatcher using the given client resolver
    pub fn new(resolver: Arc<ClientResolver>) -> Self {
        Self { resolver }
    }

    /// Run the command configured for this invocation.
    ///
    /// Returns `None` when no command was given. Never fails otherwise:
    /// every error is logged and mapped to an outcome.
    pub async fn dispatch(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Option<CommandOutcome> {
        let command = match config.explicit_command()? {
            Ok(command) => command,
            Err(e) => {
                tracing::error!("{}", e);
                return Some(CommandOutcome::Unknown);
            }
        };

        let outcome = match self.execute(command, config, artifact).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Remote playpen command {} failed: {}", command, e);
                CommandOutcome::Failed
            }
        };
        Some(outcome)
    }

    /// Run a parsed command
    pub async fn execute(
        &self,
        command: PlaypenCommand,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<CommandOutcome> {
        match command {
            PlaypenCommand::CreateManual => {
                tracing::info!("Creating remote playpen container, this may take awhile...");
                self.create_manual(config, artifact).await
            }
            PlaypenCommand::Create => {
                tracing::info!("Creating remote playpen container, this may take awhile...");
                self.create(config, artifact).await
            }
            PlaypenCommand::Delete => {
                tracing::info!("Deleting remote playpen container, this may take awhile...");
                self.delete(config).await
            }
            PlaypenCommand::Exists => self.exists(config).await,
            PlaypenCommand::Get => self.get(config).await,
            PlaypenCommand::Download => self.download(config, artifact).await,
        }
    }

    async fn create_manual(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        let archive = ArtifactArchive::build(artifact).await?;
        if client.create(archive.path(), true).await? {
            tracing::info!("Remote playpen container created");
            Ok(CommandOutcome::Succeeded)
        } else {
            tracing::error!("Failed to create remote playpen container!");
            Ok(CommandOutcome::Failed)
        }
    }

    async fn create(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        if client.exists().await? {
            tracing::info!(
                "Remote playpen already exists, delete it first if you want to create a new one"
            );
            return Ok(CommandOutcome::Skipped);
        }

        let archive = ArtifactArchive::build(artifact).await?;
        if !client.create(archive.path(), false).await? {
            tracing::error!("Failed to create remote playpen container!");
            return Ok(CommandOutcome::Failed);
        }

        tracing::info!("Remote playpen container created");
        // Report the assigned address
        self.get(config).await
    }

    async fn delete(&self, config: &SessionConfig) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        if client.delete().await? {
            tracing::info!("Deletion of remote playpen container succeeded!");
            Ok(CommandOutcome::Succeeded)
        } else {
            tracing::error!("Failed to delete remote playpen container!");
            Ok(CommandOutcome::Failed)
        }
    }

    async fn exists(&self, config: &SessionConfig) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        if client.exists().await? {
            tracing::info!("Remote playpen exists");
        } else {
            tracing::info!("Remote playpen does not exist");
        }
        Ok(CommandOutcome::Succeeded)
    }

    async fn get(&self, config: &SessionConfig) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        match client.fetch_address().await? {
            Some(host) => tracing::info!("Remote playpen host: {}", host),
            None => tracing::info!("Remote playpen does not exist"),
        }
        Ok(CommandOutcome::Succeeded)
    }

    async fn download(
        &self,
        config: &SessionConfig,
        artifact: &BuildArtifact,
    ) -> Result<CommandOutcome> {
        let Some(client) = self.resolver.client(config) else {
            return Ok(CommandOutcome::Unresolved);
        };

        let destination = artifact.download_path()?;
        client.download(&destination).await?;
        tracing::info!("Downloaded remote playpen archive to {:?}", destination);
        Ok(CommandOutcome::Succeeded)
    }
}
