//! # Light Client Errors

use shared_types::ChainError;
use thiserror::Error;

/// Errors raised while decoding, verifying or syncing light blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LightClientError {
    /// The block does not advance the trusted height.
    #[error("Stale block: height {block_height} <= trusted height {trusted_height}")]
    StaleBlock {
        block_height: u64,
        trusted_height: u64,
    },

    /// Adjacent block signed by a set other than the one the state committed to.
    #[error("Validator set hash mismatch: expected {expected}, got {actual}")]
    ValidatorSetHashMismatch { expected: String, actual: String },

    /// The stored consensus state bytes do not follow the layout.
    #[error("Malformed consensus state: {0}")]
    MalformedState(String),

    /// Block belongs to another chain.
    #[error("Chain id mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch { expected: String, actual: String },

    /// Structural problem in the header or validator set.
    #[error("Invalid light block: {0}")]
    InvalidBlock(String),

    /// Structural problem in the commit.
    #[error("Invalid commit: {0}")]
    InvalidCommit(String),

    /// Signed power did not clear the threshold.
    #[error("Not enough voting power signed: tallied {tallied}, needed more than {needed}")]
    NotEnoughVotingPower { tallied: u128, needed: u128 },

    /// A commit signature failed ed25519 verification.
    #[error("Invalid commit signature from validator {validator}")]
    InvalidSignature { validator: String },

    /// The same trusted validator appears twice in one commit.
    #[error("Double vote from validator {validator}")]
    DoubleVote { validator: String },

    /// Trust threshold outside [1/3, 1].
    #[error("Invalid trust threshold {numerator}/{denominator}")]
    InvalidTrustThreshold { numerator: u64, denominator: u64 },

    /// A previous verification failure stopped progression.
    #[error("Light client sync halted: {reason}")]
    Halted { reason: String },

    /// Chain RPC failure.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

impl LightClientError {
    /// Whether the error came from verifying data rather than fetching it.
    pub fn is_verification_failure(&self) -> bool {
        !matches!(
            self,
            LightClientError::Chain(_)
                | LightClientError::Halted { .. }
                | LightClientError::InvalidTrustThreshold { .. }
        )
    }
}

/// Result type for light client operations.
pub type LightClientResult<T> = Result<T, LightClientError>;
