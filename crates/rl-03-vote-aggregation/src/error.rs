//! # Aggregation Errors

use shared_types::ChannelId;
use thiserror::Error;

/// Errors raised while signing, verifying or aggregating votes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// Nothing to aggregate.
    #[error("No votes to aggregate")]
    NoVotes,

    /// None of the signers is in the roster.
    #[error("Insufficient quorum: {participants} of {roster_size} roster members voted")]
    InsufficientQuorum {
        participants: usize,
        roster_size: usize,
    },

    /// A signature did not parse or did not verify.
    #[error("Invalid BLS signature from {signer}")]
    InvalidSignature { signer: String },

    /// A public key did not parse.
    #[error("Invalid BLS public key {key}")]
    InvalidPublicKey { key: String },

    /// Votes for different entries were mixed in one batch.
    #[error("Mixed votes: expected channel {expected_channel} seq {expected_sequence}, got channel {channel} seq {sequence}")]
    MixedVotes {
        expected_channel: ChannelId,
        expected_sequence: u64,
        channel: ChannelId,
        sequence: u64,
    },

    /// The roster does not fit the bitset.
    #[error("Roster of {size} exceeds bitset capacity {capacity}")]
    RosterTooLarge { size: usize, capacity: usize },

    /// The vote's event hash does not match its payload.
    #[error("Event hash does not match vote payload")]
    EventHashMismatch,

    /// Key material could not be loaded.
    #[error("Signing key error: {0}")]
    Signing(String),
}

/// Result type for aggregation operations.
pub type AggregationResult<T> = Result<T, AggregationError>;
