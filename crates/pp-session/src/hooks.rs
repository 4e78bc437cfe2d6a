//! Process-exit hook registry
//!
//! The process has no exit hooks of its own, so finalizers are registered here
//! and the supervising runtime calls [`ShutdownHooks::run`] once its other
//! tasks have been told to stop (or uses [`ShutdownHooks::run_on_signal`]).
//! Every hook runs in its own task: a panicking hook is logged and does not
//! prevent the remaining hooks from completing.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::future::BoxFuture;
use futures::FutureExt;

type Hook = (String, BoxFuture<'static, ()>);

/// Finalizers to run when the process shuts down
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Hook>>,
    ran: AtomicBool,
}

impl ShutdownHooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook.
    ///
    /// Returns `false` (and drops the hook) if the hooks have already run.
    pub fn register<F>(&self, name: impl Into<String>, hook: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        if self.ran.load(Ordering::Acquire) {
            tracing::warn!("Shutdown already in progress, not registering hook {}", name);
            return false;
        }
        tracing::debug!("Registered shutdown hook {}", name);
        self.lock().push((name, hook.boxed()));
        true
    }

    /// Number of hooks waiting to run
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `run` has been called
    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::Acquire)
    }

    /// Run all registered hooks concurrently and wait for them.
    ///
    /// Only the first call does anything. Returns the number of hooks that
    /// completed without panicking.
    pub async fn run(&self) -> usize {
        if self.ran.swap(true, Ordering::AcqRel) {
            return 0;
        }

        let hooks = std::mem::take(&mut *self.lock());
        if hooks.is_empty() {
            return 0;
        }
        tracing::debug!("Running {} shutdown hooks", hooks.len());

        let handles: Vec<_> = hooks
            .into_iter()
            .map(|(name, hook)| (name, tokio::spawn(hook)))
            .collect();

        let mut completed = 0;
        for (name, handle) in handles {
            match handle.await {
                Ok(()) => completed += 1,
                Err(e) => tracing::error!("Shutdown hook {} failed: {}", name, e),
            }
        }
        completed
    }

    /// Wait for Ctrl+C or SIGTERM, then run the hooks
    pub async fn run_on_signal(&self) -> usize {
        shutdown_signal().await;
        self.run().await
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Hook>> {
        // A poisoned registry still holds valid hooks
        self.hooks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Resolves when the process receives Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hooks_run_once() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            let counter = Arc::clone(&counter);
            assert!(hooks.register(format!("hook-{}", i), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(hooks.len(), 3);

        assert_eq!(hooks.run().await, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(hooks.is_empty());
        assert!(hooks.has_run());

        // Second run is a no-op
        assert_eq!(hooks.run().await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_register_after_run_is_rejected() {
        let hooks = ShutdownHooks::new();
        hooks.run().await;
        assert!(!hooks.register("late", async {}));
        assert!(hooks.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_hook_does_not_stop_others() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        hooks.register("explodes", async {
            panic!("hook failure");
        });
        let c = Arc::clone(&counter);
        hooks.register("survives", async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hooks.run().await, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
