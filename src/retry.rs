//! Retry wrapper for remote completion calls.
//!
//! Implements exponential backoff for transient failures: rate limits and
//! upstream server errors re-attempt after a growing delay, everything else
//! aborts immediately. Exhausting the attempt cap yields the distinguishable
//! [`Error::RetriesExhausted`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::Error;

/// Backoff configuration for [`with_retry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Delay before the second attempt, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after each transient failure.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Ceiling on a single delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    crate::constants::RETRY_MAX_ATTEMPTS
}

fn default_initial_delay_ms() -> u64 {
    crate::constants::RETRY_INITIAL_DELAY_MS
}

fn default_backoff_multiplier() -> f64 {
    crate::constants::RETRY_BACKOFF_MULTIPLIER
}

fn default_max_delay_ms() -> u64 {
    crate::constants::RETRY_MAX_DELAY_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::RETRY_MAX_ATTEMPTS,
            initial_delay_ms: crate::constants::RETRY_INITIAL_DELAY_MS,
            backoff_multiplier: crate::constants::RETRY_BACKOFF_MULTIPLIER,
            max_delay_ms: crate::constants::RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// The delay before re-attempting after `failures` transient failures
    /// (1-indexed: the first failure waits the initial delay).
    fn delay_after(&self, failures: usize) -> Duration {
        let scaled = self.initial_delay_ms as f64
            * self.backoff_multiplier.powi(failures.saturating_sub(1) as i32);
        Duration::from_millis(scaled.min(self.max_delay_ms as f64) as u64)
    }
}

/// Invokes `operation` until it succeeds, fails fatally, or the attempt cap
/// is reached.
///
/// Transient failures ([`Error::is_retryable`]) sleep the current backoff
/// delay and re-attempt; the delay grows by the policy's multiplier each
/// time, clamped to the ceiling. Fatal failures are returned as-is on the
/// attempt that produced them. Running out of attempts returns
/// [`Error::RetriesExhausted`].
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    wait_ms = delay.as_millis() as u64,
                    failure = %e,
                    "transient completion failure, backing off"
                );
                if attempt < policy.max_attempts {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                error!(attempt, failure = %e, "fatal completion failure, not retrying");
                return Err(e);
            }
        }
    }
    error!(
        attempts = policy.max_attempts,
        "giving up on completion call, retries exhausted"
    );
    Err(Error::RetriesExhausted {
        attempts: policy.max_attempts,
    })
}
