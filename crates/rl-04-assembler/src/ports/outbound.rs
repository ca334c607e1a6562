//! # Outbound Ports
//!
//! The relay store written by the listener and voting pipeline, plus the two
//! chains one direction talks to.

use async_trait::async_trait;
use shared_types::{ChainResult, ChannelId, InturnRelayer, RelayEntry, RelayStatus, TxHash, Vote};

use crate::domain::{ClaimSourceChain, SubmissionAction};
use crate::error::StoreResult;

/// Persisted entries and votes of one direction - outbound port.
#[async_trait]
pub trait RelayStore: Send + Sync + 'static {
    /// Entries at exactly `(channel_id, sequence)`. Empty when none was observed.
    async fn entries_by_channel_and_sequence(
        &self,
        channel_id: ChannelId,
        sequence: u64,
    ) -> StoreResult<Vec<RelayEntry>>;

    /// Highest sequence on `channel_id` whose entries carry `status`.
    async fn latest_sequence_by_status(
        &self,
        channel_id: ChannelId,
        status: RelayStatus,
    ) -> StoreResult<Option<u64>>;

    /// Moves entries to `status` and records the claim transaction.
    async fn update_status_and_tx_hash(
        &self,
        ids: &[i64],
        status: RelayStatus,
        tx_hash: &TxHash,
    ) -> StoreResult<()>;

    /// Records a claim transaction without touching status.
    async fn update_tx_hash(&self, ids: &[i64], tx_hash: &TxHash) -> StoreResult<()>;

    /// Votes collected for `(channel_id, sequence)`.
    async fn votes_by_channel_and_sequence(
        &self,
        channel_id: ChannelId,
        sequence: u64,
    ) -> StoreResult<Vec<Vote>>;
}

/// Chain the direction delivers to - outbound port.
#[async_trait]
pub trait DestinationChain: Send + Sync + 'static {
    /// Relayer governance designates for claims coming from `source`.
    async fn inturn_relayer(&self, source: ClaimSourceChain) -> ChainResult<InturnRelayer>;

    /// Next sequence the destination will accept on `channel_id`.
    async fn next_delivery_sequence(&self, channel_id: ChannelId) -> ChainResult<u64>;

    /// Next nonce of the local relayer account.
    async fn account_nonce(&self) -> ChainResult<u64>;

    /// Account nonce read once the next block is committed.
    async fn account_nonce_on_next_block(&self) -> ChainResult<u64>;

    /// Signs and broadcasts `action` with `nonce`.
    async fn submit(&self, action: &SubmissionAction, nonce: u64) -> ChainResult<TxHash>;
}

/// Chain the direction reads packages from - outbound port.
#[async_trait]
pub trait SourceChain: Send + Sync + 'static {
    /// Next sequence the source will emit on `channel_id`.
    async fn next_send_sequence(&self, channel_id: ChannelId) -> ChainResult<u64>;
}
