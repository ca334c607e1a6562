//! # Light Client Configuration

use serde::{Deserialize, Serialize};
use shared_types::RetryConfig;

use crate::domain::TrustThreshold;

/// Light client bridge configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightClientConfig {
    /// Chain B chain id the stored state must carry.
    pub chain_id: String,

    /// Fraction of trusted power that must sign a skipping header.
    pub trust_threshold: TrustThreshold,

    /// Stop syncing after a verification failure until an operator resumes.
    pub halt_on_verification_failure: bool,

    /// Retry policy for queries. Submissions are attempted once.
    pub retry: RetryConfig,
}

impl Default for LightClientConfig {
    fn default() -> Self {
        Self {
            chain_id: "chain-b_1017-1".to_string(),
            trust_threshold: TrustThreshold::ONE_THIRD,
            halt_on_verification_failure: true,
            retry: RetryConfig::default(),
        }
    }
}

impl LightClientConfig {
    /// Create a config for testing.
    pub fn for_testing(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            retry: RetryConfig::for_testing(),
            ..Self::default()
        }
    }
}
