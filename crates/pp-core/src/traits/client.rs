//! Remote control-plane client traits

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::RemoteError;
use crate::types::ResolvedTarget;

/// Abstraction over the remote playpen control plane.
///
/// Boolean results report whether the remote side accepted the operation;
/// `Err` means the call itself could not be completed. Implementations own
/// their network timeouts.
#[async_trait]
pub trait RemoteSessionClient: Send + Sync {
    /// Whether the remote playpen exists (no side effects)
    async fn exists(&self) -> Result<bool, RemoteError>;

    /// Address of the remote playpen, `None` if it does not exist
    async fn fetch_address(&self) -> Result<Option<String>, RemoteError>;

    /// Upload `archive` and create the playpen.
    ///
    /// `manual` suppresses the automatic follow-up connect on the remote side.
    async fn create(&self, archive: &Path, manual: bool) -> Result<bool, RemoteError>;

    /// Delete the remote playpen
    async fn delete(&self) -> Result<bool, RemoteError>;

    /// Validate credentials before any other call
    async fn challenge(&self) -> Result<bool, RemoteError>;

    /// Whether the target is a pre-provisioned host rather than one to create
    fn is_existing_host_target(&self) -> bool;

    /// Connect to the playpen, asking the remote to clean up on exit if requested
    async fn connect(&self, cleanup_on_exit: bool) -> Result<bool, RemoteError>;

    /// Disconnect from the playpen
    async fn disconnect(&self) -> Result<bool, RemoteError>;

    /// Download the remote archive to `destination`
    async fn download(&self, destination: &Path) -> Result<(), RemoteError>;
}

/// Builds clients from resolved connection parameters.
///
/// Construction is expected to be cheap; a fresh client is built for
/// every operation that needs one.
pub trait ClientFactory: Send + Sync {
    /// Create a client for the given target
    fn create_client(&self, target: &ResolvedTarget) -> Arc<dyn RemoteSessionClient>;
}

impl<F> ClientFactory for F
where
    F: Fn(&ResolvedTarget) -> Arc<dyn RemoteSessionClient> + Send + Sync,
{
    fn create_client(&self, target: &ResolvedTarget) -> Arc<dyn RemoteSessionClient> {
        self(target)
    }
}
