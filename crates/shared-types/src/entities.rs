//! # Relay Domain Entities
//!
//! Defines the entities shared by every relayer subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `BlsPublicKey`, `BlsSignature`, `Address`, `TxHash`
//! - **Rosters**: `RosterMember`, `RelayerRecord` (Chain A), `ValidatorRecord` (Chain B)
//! - **Delivery**: `ChannelId`, `RelayStatus`, `RelayEntry`, `Vote`, `InturnRelayer`

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

// Re-export U256 from primitive-types for the Chain A bitset encoding
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Width of a compressed BLS12-381 G1 public key.
pub const BLS_PUBLIC_KEY_LENGTH: usize = 48;

/// Width of a compressed BLS12-381 G2 signature.
pub const BLS_SIGNATURE_LENGTH: usize = 96;

/// A compressed BLS public key identifying one relayer.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlsPublicKey(#[serde_as(as = "Bytes")] pub [u8; BLS_PUBLIC_KEY_LENGTH]);

impl BlsPublicKey {
    /// Builds a key from a slice, returning `None` when the width is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; BLS_PUBLIC_KEY_LENGTH] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Parses a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = hex::decode(s.trim_start_matches("0x")).ok()?;
        Self::from_slice(&raw)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A compressed BLS signature (single or aggregated).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsSignature(#[serde_as(as = "Bytes")] pub [u8; BLS_SIGNATURE_LENGTH]);

impl BlsSignature {
    /// Builds a signature from a slice, returning `None` when the width is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; BLS_SIGNATURE_LENGTH] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BlsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsSignature({}..)", hex::encode(&self.0[..8]))
    }
}

/// Hash of a submitted destination-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// CLUSTER B: ROSTERS
// =============================================================================

/// Capability shared by every roster shape the vote aggregator accepts.
///
/// A roster is an ordered slice; the position of a member in that slice is
/// its bit index in the participant bitset.
pub trait RosterMember: Clone + Send + Sync + 'static {
    /// BLS key the member signs votes with.
    fn bls_public_key(&self) -> &BlsPublicKey;
}

/// A registered relayer as reported by the Chain A light-client contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerRecord {
    /// Account the relayer submits from.
    pub address: Address,
    /// Key the relayer votes with.
    pub bls_public_key: BlsPublicKey,
}

impl RosterMember for RelayerRecord {
    fn bls_public_key(&self) -> &BlsPublicKey {
        &self.bls_public_key
    }
}

/// A Chain B validator, carrying its consensus key and its relayer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Ed25519 consensus public key.
    pub consensus_pubkey: [u8; 32],
    /// Voting power in the Chain B validator set.
    pub voting_power: u64,
    /// Address of the relayer operated by this validator.
    pub relayer_address: Address,
    /// BLS key of the relayer operated by this validator.
    pub relayer_bls_key: BlsPublicKey,
}

impl RosterMember for ValidatorRecord {
    fn bls_public_key(&self) -> &BlsPublicKey {
        &self.relayer_bls_key
    }
}

// =============================================================================
// CLUSTER C: DELIVERY
// =============================================================================

/// Independent sequence space for one category of cross-chain message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// Generic oracle channel carrying Chain A packages.
    pub const ORACLE: ChannelId = ChannelId(0);
    /// Soul-bound token application channel.
    pub const SBT: ChannelId = ChannelId(10);
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a persisted relay entry. Ordered: transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelayStatus {
    /// Observed by the listener.
    Saved,
    /// Enough votes have been collected.
    AllVoted,
    /// Claimed on the destination chain by the in-turn relayer.
    Delivered,
}

impl RelayStatus {
    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_transition_to(self, next: RelayStatus) -> bool {
        next >= self
    }

    /// Whether the assembler may consume an entry in this status.
    pub fn is_assemblable(self) -> bool {
        matches!(self, RelayStatus::AllVoted | RelayStatus::Delivered)
    }
}

/// A persisted package (Chain A origin) or transaction (Chain B origin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEntry {
    /// Store-assigned identifier.
    pub id: i64,
    /// Channel the entry belongs to.
    pub channel_id: ChannelId,
    /// Oracle or channel sequence.
    pub sequence: u64,
    /// Current lifecycle status.
    pub status: RelayStatus,
    /// Unix seconds at which the source chain emitted the entry.
    pub tx_time: i64,
    /// Source-chain height the entry was observed at.
    pub height: u64,
    /// Raw package payload.
    pub payload: Vec<u8>,
    /// Hash of the claim transaction, once one was submitted.
    pub claimed_tx_hash: Option<TxHash>,
}

/// One relayer's attestation over a (channel, sequence) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Channel of the attested entry.
    pub channel_id: ChannelId,
    /// Sequence of the attested entry.
    pub sequence: u64,
    /// Signer key.
    pub pub_key: BlsPublicKey,
    /// Signature over `event_hash`.
    pub signature: BlsSignature,
    /// Payload the claim will carry.
    pub claim_payload: Vec<u8>,
    /// Digest every relayer signs for this entry.
    pub event_hash: Hash,
    /// Unix seconds of the attested entry.
    pub tx_time: i64,
}

/// The relayer chain governance currently designates for a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InturnRelayer {
    /// Key of the designated relayer.
    pub bls_public_key: BlsPublicKey,
    /// Unix seconds the window opens.
    pub interval_start: u64,
    /// Unix seconds the window closes.
    pub interval_end: u64,
}
