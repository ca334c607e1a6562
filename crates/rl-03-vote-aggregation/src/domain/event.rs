//! # Event Hash
//!
//! Digest every relayer signs for one entry:
//! `keccak256(channel[1] | sequence[8] | payload)`.

use sha3::{Digest, Keccak256};
use shared_types::{ChannelId, Hash};

/// Computes the digest votes for `(channel, sequence, payload)` are signed over.
pub fn compute_event_hash(channel: ChannelId, sequence: u64, payload: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update([channel.0]);
    hasher.update(sequence.to_be_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}
