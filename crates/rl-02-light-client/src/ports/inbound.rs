//! # Inbound Ports
//!
//! What the assembler consumes from the light client bridge.

use async_trait::async_trait;
use shared_types::TxHash;

use crate::domain::LightClientResult;

/// Keeps the destination light client able to verify packages.
#[async_trait]
pub trait LightClientApi: Send + Sync {
    /// Syncs a header at `height` unless the on-chain client already reached it.
    ///
    /// Returns the sync transaction hash when one was submitted.
    async fn ensure_synced(&self, height: u64) -> LightClientResult<Option<TxHash>>;

    /// Whether a verification failure stopped progression.
    fn is_halted(&self) -> bool;
}
