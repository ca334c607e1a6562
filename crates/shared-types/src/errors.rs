//! # Error Types
//!
//! Errors raised by chain RPC collaborators, shared by every port that talks
//! to either chain.

use thiserror::Error;

/// Failures reported by a chain RPC collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Network or node failure; safe to retry.
    #[error("Transient RPC failure: {0}")]
    Transient(String),

    /// The call exceeded its deadline.
    #[error("RPC call timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The destination rejected the nonce (already used or too far ahead).
    #[error("Nonce conflict: {0}")]
    NonceConflict(String),

    /// The destination already advanced past the submitted sequence.
    #[error("Sequence conflict: {0}")]
    SequenceConflict(String),

    /// The destination rejected the transaction for any other reason.
    #[error("Transaction rejected (code {code}): {log}")]
    Rejected { code: u32, log: String },
}

impl ChainError {
    /// Whether the bounded retry helper should try the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChainError::Transient(_) | ChainError::Timeout { .. })
    }

    /// Whether the failure signals a race with another submitter.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ChainError::NonceConflict(_) | ChainError::SequenceConflict(_)
        )
    }
}

/// Result alias for chain RPC calls.
pub type ChainResult<T> = Result<T, ChainError>;
