//! # Leader Election
//!
//! The in-turn relayer is whatever chain governance reports; the local process
//! only compares keys and honors the reported window.

use shared_types::{BlsPublicKey, InturnRelayer};

use crate::error::{AssemblerError, AssemblerResult};

/// Role of the local relayer for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Designated relayer: caches counters and claims immediately.
    Leader,
    /// Failover path: re-reads counters and waits for the leader first.
    Follower,
}

impl Role {
    /// Whether this is the leader role.
    pub fn is_leader(self) -> bool {
        self == Role::Leader
    }
}

/// Byte-exact comparison of the local key against the reported in-turn key.
pub fn is_in_turn(local: &BlsPublicKey, inturn: &InturnRelayer) -> bool {
    local == &inturn.bls_public_key
}

/// Role for a tick at `now`.
///
/// A matching key whose window already closed demotes the local relayer: the
/// chain is about to report someone else.
pub fn evaluate_role(local: &BlsPublicKey, inturn: &InturnRelayer, now: i64) -> Role {
    let window_closed = inturn.interval_end > inturn.interval_start
        && now > inturn.interval_end as i64;
    if is_in_turn(local, inturn) && !window_closed {
        Role::Leader
    } else {
        Role::Follower
    }
}

/// Outcome of the post-rotation grace check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraceCheck {
    /// Destination counters have settled.
    Ready,
    /// Still inside the grace period.
    Wait {
        /// Seconds left before counters are trusted.
        remaining_secs: i64,
    },
}

/// Checks whether a new leader may read destination counters.
///
/// `now` before the window start means the local clock disagrees with the
/// chain; that is surfaced, never corrected.
pub fn leader_grace(now: i64, inturn: &InturnRelayer, latency_secs: i64) -> AssemblerResult<GraceCheck> {
    let elapsed = now - inturn.interval_start as i64;
    if elapsed < 0 {
        return Err(AssemblerError::ClockSkew {
            now,
            interval_start: inturn.interval_start,
        });
    }
    if elapsed < latency_secs {
        return Ok(GraceCheck::Wait {
            remaining_secs: latency_secs - elapsed,
        });
    }
    Ok(GraceCheck::Ready)
}
