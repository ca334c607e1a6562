//! # Bounded Retry
//!
//! Every chain call runs under a per-call deadline and is retried a fixed
//! number of times with a fixed delay. Only the last error is surfaced.
//! Conflicts and rejections are returned immediately: retrying them with the
//! same inputs cannot succeed.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::errors::{ChainError, ChainResult};

/// Retry policy for chain RPC calls.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first call.
    pub attempts: u32,
    /// Pause between attempts.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub delay: Duration,
    /// Deadline for a single attempt.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub call_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(500),
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Fast policy for tests.
    pub fn for_testing() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(10),
            call_timeout: Duration::from_secs(1),
        }
    }
}

/// Runs `call` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: &str, mut call: F) -> ChainResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ChainResult<T>>,
{
    let attempts = config.attempts.max(1);
    let mut last_error = ChainError::Transient(format!("{operation}: no attempt made"));

    for attempt in 1..=attempts {
        let outcome = match tokio::time::timeout(config.call_timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout {
                millis: config.call_timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "chain call failed"
                );
                last_error = e;
                if attempt < attempts {
                    tokio::time::sleep(config.delay).await;
                }
            }
        }
    }

    Err(last_error)
}
