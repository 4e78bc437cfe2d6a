//! Live-session start guard
//!
//! The dev tooling may re-run the live-session path on every incremental
//! rebuild. The guard makes sure only one attempt provisions and connects at
//! a time, and that once an attempt has connected no further attempt runs
//! for the lifetime of the controller.

use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const STARTING: u8 = 1;
const CONNECTED: u8 = 2;

/// Tracks whether the live session has been established
#[derive(Debug, Default)]
pub struct SessionGuard {
    state: AtomicU8,
}

impl SessionGuard {
    /// Create a guard in the idle state
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Whether an attempt has connected successfully
    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::Acquire) == CONNECTED
    }

    /// Claim the right to attempt a start.
    ///
    /// Returns `None` if another attempt is running or one already succeeded.
    pub fn try_begin(&self) -> Option<StartAttempt<'_>> {
        self.state
            .compare_exchange(IDLE, STARTING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| StartAttempt {
                guard: self,
                completed: false,
            })
    }
}

/// An in-flight start attempt.
///
/// Dropping it without calling [`StartAttempt::complete`] returns the guard
/// to idle so a later rebuild may retry.
#[must_use = "dropping the attempt immediately releases the guard"]
pub struct StartAttempt<'a> {
    guard: &'a SessionGuard,
    completed: bool,
}

impl StartAttempt<'_> {
    /// Record a successful connect; the guard never leaves this state
    pub fn complete(mut self) {
        self.guard.state.store(CONNECTED, Ordering::Release);
        self.completed = true;
    }
}

impl Drop for StartAttempt<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.guard.state.store(IDLE, Ordering::Release);
        }
    }
}
