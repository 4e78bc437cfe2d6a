//! Dev-loop liveness probes
//!
//! The shutdown sequence waits for the dev loop to finish before it prints
//! its own messages. When the dev loop is under our control it should hand
//! out an explicit [`CompletionSignal`]. [`NamedThreadProbe`] is a
//! compatibility shim for dev loops that only expose a thread name.

use pp_core::traits::DevLoopLiveness;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Held by the dev loop; dropping it (or calling `finish`) marks it done
pub struct DevLoopTracker {
    _guard: DropGuard,
}

impl DevLoopTracker {
    /// Mark the dev loop as finished
    pub fn finish(self) {}
}

/// Observes a [`DevLoopTracker`]
#[derive(Clone)]
pub struct CompletionSignal {
    token: CancellationToken,
}

impl CompletionSignal {
    /// Resolves once the dev loop has finished
    pub async fn finished(&self) {
        self.token.cancelled().await
    }
}

impl DevLoopLiveness for CompletionSignal {
    fn is_alive(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Create a linked tracker/signal pair
pub fn completion_signal() -> (DevLoopTracker, CompletionSignal) {
    let token = CancellationToken::new();
    let tracker = DevLoopTracker {
        _guard: token.clone().drop_guard(),
    };
    (tracker, CompletionSignal { token })
}

/// Used when there is no dev loop to wait for
#[derive(Debug, Clone, Copy, Default)]
pub struct NotTracked;

impl DevLoopLiveness for NotTracked {
    fn is_alive(&self) -> bool {
        false
    }
}

/// Linux truncates thread names to 15 bytes
const THREAD_NAME_LIMIT: usize = 15;

/// Looks for a live thread of this process by name.
///
/// Only supported on Linux (via `/proc/self/task`); elsewhere the probe
/// always reports the thread as gone.
#[derive(Debug, Clone)]
pub struct NamedThreadProbe {
    name: String,
}

impl NamedThreadProbe {
    /// Probe for threads whose name contains `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DevLoopLiveness for NamedThreadProbe {
    fn is_alive(&self) -> bool {
        thread_names()
            .iter()
            .any(|observed| thread_name_matches(observed, &self.name))
    }
}

fn thread_name_matches(observed: &str, wanted: &str) -> bool {
    if observed.is_empty() {
        return false;
    }
    observed.contains(wanted)
        || (observed.len() == THREAD_NAME_LIMIT && wanted.starts_with(observed))
}

#[cfg(target_os = "linux")]
fn thread_names() -> Vec<String> {
    let tasks = match std::fs::read_dir("/proc/self/task") {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::debug!("Cannot list threads: {}", e);
            return Vec::new();
        }
    };

    tasks
        .filter_map(Result::ok)
        .filter_map(|task| std::fs::read_to_string(task.path().join("comm")).ok())
        .map(|name| name.trim_end_matches('\n').to_string())
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn thread_names() -> Vec<String> {
    Vec::new()
}
