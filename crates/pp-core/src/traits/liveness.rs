//! Dev-loop liveness

/// Reports whether the concurrently running dev loop is still shutting down.
///
/// The shutdown sequence polls this so the dev loop can finish its own
/// terminal output before the playpen disconnect messages appear.
pub trait DevLoopLiveness: Send + Sync {
    /// `true` while the dev loop is still running
    fn is_alive(&self) -> bool;
}
