//! # Assembler Errors
//!
//! Every variant is scoped to one tick: the loop logs it and moves on.

use rl_01_validator_cache::RosterError;
use rl_02_light_client::LightClientError;
use rl_03_vote_aggregation::AggregationError;
use shared_types::{ChainError, ChannelId, RelayStatus};
use thiserror::Error;

/// Failures raised by the relay store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("Store backend failure: {0}")]
    Backend(String),

    /// An update would move an entry backwards in its lifecycle.
    #[error("Entry {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: i64,
        from: RelayStatus,
        to: RelayStatus,
    },

    /// An update named an entry the store does not hold.
    #[error("Unknown entry {0}")]
    UnknownEntry(i64),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while assembling and submitting one direction's batch.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// Local clock is behind the start of the reported leadership window.
    #[error("Clock skew: local time {now} is before in-turn window start {interval_start}")]
    ClockSkew { now: i64, interval_start: u64 },

    /// A chain query failed after retries.
    #[error("Chain query failed: {0}")]
    Chain(#[from] ChainError),

    /// The relay store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Votes could not be aggregated.
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The roster could not be loaded.
    #[error("Roster unavailable: {0}")]
    Roster(#[from] RosterError),

    /// The payload could not be turned into a submission plan.
    #[error("Cannot plan submission: {0}")]
    Plan(String),

    /// The destination light client could not be brought up to date.
    #[error("Light client sync failed: {0}")]
    LightClient(#[from] LightClientError),

    /// The destination rejected the nonce of a submission.
    #[error("Nonce conflict on channel {channel_id} sequence {sequence}: {detail}")]
    NonceConflict {
        channel_id: ChannelId,
        sequence: u64,
        detail: String,
    },

    /// The destination already advanced past the submitted sequence.
    #[error("Sequence conflict on channel {channel_id} sequence {sequence}: {detail}")]
    SequenceConflict {
        channel_id: ChannelId,
        sequence: u64,
        detail: String,
    },
}

impl AssemblerError {
    /// Maps a failed submission, lifting conflicts into their own variants.
    pub fn from_submission(channel_id: ChannelId, sequence: u64, error: ChainError) -> Self {
        match error {
            ChainError::NonceConflict(detail) => AssemblerError::NonceConflict {
                channel_id,
                sequence,
                detail,
            },
            ChainError::SequenceConflict(detail) => AssemblerError::SequenceConflict {
                channel_id,
                sequence,
                detail,
            },
            other => AssemblerError::Chain(other),
        }
    }

    /// Whether another submitter raced this one.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AssemblerError::NonceConflict { .. } | AssemblerError::SequenceConflict { .. }
        )
    }
}

/// Result type for assembler operations.
pub type AssemblerResult<T> = Result<T, AssemblerError>;
