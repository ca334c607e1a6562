//! # Roster Errors

use shared_types::ChainError;
use thiserror::Error;

/// Errors raised while loading a roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The chain query failed after retries.
    #[error("Roster query failed: {0}")]
    Chain(#[from] ChainError),

    /// The chain reported no members; the cached roster is kept.
    #[error("Chain returned an empty roster")]
    EmptyRoster,
}

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;
