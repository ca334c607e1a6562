//! # Outbound Ports
//!
//! Chain collaborators: a Chain B node serving light blocks and the Chain A
//! light-client contract.

use async_trait::async_trait;
use shared_types::{ChainResult, TxHash};

use crate::domain::LightBlock;

/// Chain B node - outbound port.
#[async_trait]
pub trait LightBlockSource: Send + Sync + 'static {
    /// Header, commit and validator set at `height`.
    async fn query_light_block(&self, height: u64) -> ChainResult<LightBlock>;
}

/// Chain A light-client contract - outbound port.
#[async_trait]
pub trait LightClientContract: Send + Sync + 'static {
    /// Stored consensus state bytes.
    async fn consensus_state_bytes(&self) -> ChainResult<Vec<u8>>;

    /// Trusted Chain B height.
    async fn latest_height(&self) -> ChainResult<u64>;

    /// Submits a validation result for the header at `height`.
    async fn sync_light_block(&self, validation_result: Vec<u8>, height: u64)
        -> ChainResult<TxHash>;
}
