//! Bounded polling primitives
//!
//! Both waits stop as soon as their predicate turns false or their iteration
//! budget runs out. Neither accepts an external cancel signal: they only run
//! during short, bounded phases such as process teardown.

use std::future::Future;
use std::time::Duration;

use pp_core::config::{BackoffPolicy, FixedIntervalPolicy};

/// How a bounded wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The predicate turned false after this many sleeps
    Satisfied { iterations: u32 },
    /// The iteration budget ran out while the predicate still held
    Exhausted,
}

impl PollOutcome {
    /// Whether the predicate was observed false
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied { .. })
    }
}

/// Exponential backoff that grows up to a cap
pub struct ExponentialBackoff {
    /// Current delay
    current: Duration,
    /// Delay stops growing at this value
    cap: Duration,
    /// Multiplier
    multiplier: u32,
}

impl ExponentialBackoff {
    /// Create a new backoff from a policy
    pub fn from_policy(policy: &BackoffPolicy) -> Self {
        Self::new(policy.initial, policy.cap, policy.multiplier)
    }

    /// Create a new backoff with custom parameters
    pub fn new(initial: Duration, cap: Duration, multiplier: u32) -> Self {
        Self {
            current: initial,
            cap,
            multiplier,
        }
    }

    /// Get the next delay and advance the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        if self.current < self.cap {
            let next = self.current.saturating_mul(self.multiplier);
            self.current = std::cmp::min(next, self.cap);
        }
        delay
    }
}

/// Sleep with exponential backoff while `still_alive` holds.
///
/// The predicate is checked before every sleep, so a predicate that is
/// false from the start returns immediately without sleeping.
pub async fn wait_with_backoff<F>(mut still_alive: F, policy: &BackoffPolicy) -> PollOutcome
where
    F: FnMut() -> bool,
{
    let mut backoff = ExponentialBackoff::from_policy(policy);
    for iteration in 0..policy.max_iterations {
        if !still_alive() {
            return PollOutcome::Satisfied { iterations: iteration };
        }
        tokio::time::sleep(backoff.next_delay()).await;
    }
    PollOutcome::Exhausted
}

/// Sleep at a fixed interval while `still_present` holds.
///
/// The predicate receives the zero-based iteration index. An error from the
/// predicate ends the wait and is returned to the caller.
pub async fn wait_fixed_interval<F, Fut, E>(
    mut still_present: F,
    policy: &FixedIntervalPolicy,
) -> Result<PollOutcome, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    for iteration in 0..policy.max_iterations {
        if !still_present(iteration).await? {
            return Ok(PollOutcome::Satisfied { iterations: iteration });
        }
        tokio::time::sleep(policy.interval).await;
    }
    Ok(PollOutcome::Exhausted)
}
