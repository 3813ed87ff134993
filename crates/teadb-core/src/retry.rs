//! Retry with exponential back-off and jitter, shared by every outbound HTTP
//! client in the workspace.
//!
//! Each crate's error enum opts in through [`Transient`]; the helper itself
//! knows nothing about HTTP.

use std::future::Future;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 60_000;

/// Classifies an error as worth retrying after a back-off delay.
///
/// Implementors return `true` for rate limiting, network failures, and 5xx
/// responses. Anything a retry cannot fix (404, other 4xx, parse failures)
/// must return `false`.
pub trait Transient {
    fn is_transient(&self) -> bool;

    /// Minimum wait the server asked for (`Retry-After`), if any.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Bounded retry settings. `max_retries` counts attempts after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Un-jittered delay before retry number `attempt` (1-based), capped at 60 s.
    #[must_use]
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let exp = attempt.saturating_sub(1).min(10);
        self.backoff_base_ms
            .saturating_mul(1u64 << exp)
            .min(MAX_DELAY_MS)
    }

    /// Sleep before retry `attempt`: the jittered back-off, raised to the
    /// server's `Retry-After` when that is longer. Both are capped at 60 s.
    #[must_use]
    pub fn delay_ms(&self, attempt: u32, jitter: f64, retry_after: Option<Duration>) -> u64 {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let backoff = (self.base_delay_ms(attempt) as f64 * jitter) as u64;
        let server = retry_after.map_or(0, |d| {
            u64::try_from(d.as_millis()).unwrap_or(u64::MAX).min(MAX_DELAY_MS)
        });
        backoff.max(server)
    }
}

/// Runs `operation`, retrying transient failures according to `policy`.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep before it            |
/// |-------|----------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter |
/// | 3     | 1 000 ms × 2² ± 25 % jitter |
///
/// Delay is capped at 60 s. When the error carries a `Retry-After` hint the
/// sleep is at least that long. Non-transient errors are returned immediately.
///
/// # Errors
///
/// Returns the first non-transient error, or the last transient error once
/// `policy.max_retries` retries are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>() * 0.5 + 0.75;
                let delay_ms = policy.delay_ms(attempt, jitter, err.retry_after());
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
