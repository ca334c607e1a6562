//! # Vote Aggregator
//!
//! Combines the votes for one entry against a canonical roster.

use std::collections::{HashMap, HashSet};

use shared_types::{BlsPublicKey, BlsSignature, Hash, RosterMember, Vote};
use tracing::debug;

use crate::domain::bitset::{ParticipantBitset, VALIDATORS_CAPACITY};
use crate::domain::bls::{aggregate_signatures, parse_signature, verify_aggregate, verify_signature};
use crate::domain::event::compute_event_hash;
use crate::error::{AggregationError, AggregationResult};

/// Aggregated signature plus the roster positions behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedVotes {
    /// Sum of the contributing signatures.
    pub signature: BlsSignature,
    /// Contributing roster positions.
    pub bitset: ParticipantBitset,
    /// Payload the votes attest to.
    pub claim_payload: Vec<u8>,
    /// Digest the votes cover.
    pub event_hash: Hash,
}

impl AggregatedVotes {
    /// Checks the aggregate against the keys its bitset selects from `roster`.
    pub fn verify<M: RosterMember>(&self, roster: &[M]) -> AggregationResult<()> {
        let keys: Vec<BlsPublicKey> = self
            .bitset
            .positions()
            .into_iter()
            .filter_map(|i| roster.get(i).map(|m| *m.bls_public_key()))
            .collect();
        verify_aggregate(&keys, &self.event_hash, &self.signature)
    }
}

/// Stateless BLS vote aggregator.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteAggregator;

impl VoteAggregator {
    /// Create an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Aggregates `votes` for one (channel, sequence) against `roster`.
    ///
    /// A key voting more than once counts once. Votes from keys outside the
    /// roster neither set a bit nor contribute a signature, so the aggregate
    /// always matches its bitset. Input order does not affect the result.
    pub fn aggregate<M: RosterMember>(
        &self,
        votes: &[Vote],
        roster: &[M],
    ) -> AggregationResult<AggregatedVotes> {
        let first = votes.first().ok_or(AggregationError::NoVotes)?;
        if roster.len() > VALIDATORS_CAPACITY {
            return Err(AggregationError::RosterTooLarge {
                size: roster.len(),
                capacity: VALIDATORS_CAPACITY,
            });
        }

        let mut by_signer: HashMap<&BlsPublicKey, &Vote> = HashMap::with_capacity(votes.len());
        for vote in votes {
            if vote.channel_id != first.channel_id || vote.sequence != first.sequence {
                return Err(AggregationError::MixedVotes {
                    expected_channel: first.channel_id,
                    expected_sequence: first.sequence,
                    channel: vote.channel_id,
                    sequence: vote.sequence,
                });
            }
            by_signer.entry(&vote.pub_key).or_insert(vote);
        }

        let mut bitset = ParticipantBitset::new();
        let mut contributed: HashSet<&BlsPublicKey> = HashSet::new();
        let mut signatures = Vec::new();

        for (position, member) in roster.iter().enumerate() {
            let key = member.bls_public_key();
            let Some(vote) = by_signer.get(key) else {
                continue;
            };
            bitset.set(position);
            if contributed.insert(key) {
                signatures.push(parse_signature(&vote.signature, key)?);
            }
        }

        if signatures.is_empty() {
            return Err(AggregationError::InsufficientQuorum {
                participants: 0,
                roster_size: roster.len(),
            });
        }

        let signature = aggregate_signatures(&signatures)?;
        debug!(
            channel_id = %first.channel_id,
            sequence = first.sequence,
            votes = votes.len(),
            participants = bitset.count(),
            roster = roster.len(),
            "[rl-03] Votes aggregated"
        );

        Ok(AggregatedVotes {
            signature,
            bitset,
            claim_payload: first.claim_payload.clone(),
            event_hash: first.event_hash,
        })
    }
}

/// Ingestion-time check: the event hash matches the payload and the
/// signature verifies under the claimed key.
pub fn verify_vote(vote: &Vote) -> AggregationResult<()> {
    let expected = compute_event_hash(vote.channel_id, vote.sequence, &vote.claim_payload);
    if expected != vote.event_hash {
        return Err(AggregationError::EventHashMismatch);
    }
    verify_signature(&vote.pub_key, &vote.event_hash, &vote.signature)
}
