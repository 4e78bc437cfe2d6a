//! Teardown of the live session at process exit
//!
//! The sequence is best effort and deliberately delays exit:
//! 1. Give the dev loop a chance to finish its own shutdown output
//! 2. Disconnect from the playpen
//! 3. If this process created the container, wait for the remote side to
//!    remove it
//!
//! [`ShutdownCoordinator::run`] reports failures as errors;
//! [`ShutdownCoordinator::run_to_completion`] is the boundary used by the
//! exit hook and only logs them.

use std::sync::Arc;

use pp_core::config::PollConfig;
use pp_core::error::{RemoteError, RemoteOperation};
use pp_core::traits::{DevLoopLiveness, RemoteSessionClient};
use pp_core::{Result, SessionState};

use crate::poll::{wait_fixed_interval, wait_with_backoff, PollOutcome};

/// How the shutdown sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Disconnected; the container is not ours to clean up
    Disconnected,
    /// Disconnected and the remote container is gone
    CleanedUp,
    /// Disconnected but the container was still present when the wait ran out
    CleanupTimedOut,
}

/// Disconnects the live session when the process shuts down
#[derive(Clone)]
pub struct ShutdownCoordinator {
    client: Arc<dyn RemoteSessionClient>,
    owns_cleanup: bool,
    dev_loop: Arc<dyn DevLoopLiveness>,
    poll: PollConfig,
}

impl ShutdownCoordinator {
    /// Create a coordinator for an established session
    pub fn new(
        client: Arc<dyn RemoteSessionClient>,
        owns_cleanup: bool,
        dev_loop: Arc<dyn DevLoopLiveness>,
        poll: PollConfig,
    ) -> Self {
        Self {
            client,
            owns_cleanup,
            dev_loop,
            poll,
        }
    }

    /// Run the sequence, logging instead of returning any failure
    pub async fn run_to_completion(self) {
        match self.run().await {
            Ok(outcome) => tracing::debug!("Playpen shutdown finished: {:?}", outcome),
            Err(e) => tracing::error!("Playpen shutdown failed: {}", e),
        }
    }

    /// Run the shutdown sequence
    pub async fn run(&self) -> Result<ShutdownOutcome> {
        tracing::info!("Waiting for the dev loop to shut down...");
        let dev_loop =
            wait_with_backoff(|| self.dev_loop.is_alive(), &self.poll.dev_loop_wait).await;
        if !dev_loop.is_satisfied() {
            tracing::debug!("Dev loop still running, continuing with playpen shutdown");
        }
        tokio::time::sleep(self.poll.grace_period).await;

        if self.owns_cleanup {
            tracing::info!("Cleaning up remote playpen container, this may take awhile...");
        } else {
            tracing::info!("Disconnecting from playpen...");
        }

        if !self.client.disconnect().await? {
            // Remote state is unknown, so there is nothing to wait for
            return Err(RemoteError::Rejected {
                operation: RemoteOperation::Disconnect,
            }
            .into());
        }
        tracing::debug!("Remote playpen state: {}", SessionState::ExistsUnconnected);

        if !self.owns_cleanup {
            return Ok(ShutdownOutcome::Disconnected);
        }

        let client = Arc::clone(&self.client);
        let outcome = wait_fixed_interval(
            move |iteration| {
                let client = Arc::clone(&client);
                async move {
                    let present = client.exists().await?;
                    if present && iteration == 0 {
                        tracing::info!("Waiting for remote playpen cleanup...");
                    }
                    Ok::<_, RemoteError>(present)
                }
            },
            &self.poll.cleanup_wait,
        )
        .await?;

        match outcome {
            PollOutcome::Satisfied { .. } => {
                tracing::debug!("Remote playpen state: {}", SessionState::NonExistent);
                Ok(ShutdownOutcome::CleanedUp)
            }
            PollOutcome::Exhausted => {
                tracing::warn!("Remote playpen container still exists after waiting for cleanup");
                Ok(ShutdownOutcome::CleanupTimedOut)
            }
        }
    }
}
