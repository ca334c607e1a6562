//! # Vote Signer
//!
//! Holds the local relayer's BLS key and produces votes.

use std::fmt;

use blst::min_pk::SecretKey;
use shared_types::{BlsPublicKey, BlsSignature, ChannelId, Vote};

use crate::domain::bls::BLS_DST;
use crate::domain::event::compute_event_hash;
use crate::error::{AggregationError, AggregationResult};

/// Local BLS signing key.
pub struct VoteSigner {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl VoteSigner {
    /// Loads a 32-byte big-endian secret scalar.
    pub fn from_secret_bytes(bytes: &[u8]) -> AggregationResult<Self> {
        let secret = SecretKey::from_bytes(bytes)
            .map_err(|e| AggregationError::Signing(format!("{e:?}")))?;
        Ok(Self::from_secret(secret))
    }

    /// Derives a key from at least 32 bytes of input key material.
    pub fn from_seed(ikm: &[u8]) -> AggregationResult<Self> {
        let secret = SecretKey::key_gen(ikm, &[])
            .map_err(|e| AggregationError::Signing(format!("{e:?}")))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = BlsPublicKey(secret.sk_to_pk().to_bytes());
        Self { secret, public }
    }

    /// Key other relayers know this relayer by.
    pub fn public_key(&self) -> BlsPublicKey {
        self.public
    }

    /// Signs an arbitrary digest.
    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature(self.secret.sign(message, BLS_DST, &[]).to_bytes())
    }

    /// Produces this relayer's vote for one entry.
    pub fn sign_vote(
        &self,
        channel_id: ChannelId,
        sequence: u64,
        claim_payload: Vec<u8>,
        tx_time: i64,
    ) -> Vote {
        let event_hash = compute_event_hash(channel_id, sequence, &claim_payload);
        Vote {
            channel_id,
            sequence,
            pub_key: self.public,
            signature: self.sign(&event_hash),
            claim_payload,
            event_hash,
            tx_time,
        }
    }
}

impl fmt::Debug for VoteSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoteSigner")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
