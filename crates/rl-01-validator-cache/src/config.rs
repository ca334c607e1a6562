//! # Validator Cache Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use shared_types::RetryConfig;

/// Refresh policy for one roster cache.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorCacheConfig {
    /// Interval between background refreshes.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub refresh_interval: Duration,

    /// Retry policy for roster queries.
    pub retry: RetryConfig,
}

impl Default for ValidatorCacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            retry: RetryConfig::default(),
        }
    }
}

impl ValidatorCacheConfig {
    /// Create a config for testing (short intervals).
    pub fn for_testing() -> Self {
        Self {
            refresh_interval: Duration::from_secs(1),
            retry: RetryConfig::for_testing(),
        }
    }
}
