//! # Submission Plans
//!
//! A claim may need auxiliary transactions before it. A plan is the ordered
//! list of sub-transactions for one sequence, each with a nonce offset from a
//! base the coordinator reserves up front.
//!
//! ```text
//! plain claim:         [ claim @ N ]
//! sbt minted ack:      [ ack_minted @ N, claim @ N+1 ]
//! ```

use alloy_sol_types::{sol, SolValue};
use rl_03_vote_aggregation::ParticipantBitset;
use shared_types::{Address, BlsSignature, ChannelId};
use tracing::debug;

use crate::domain::claim_source::ClaimSourceChain;
use crate::error::{AssemblerError, AssemblerResult};

/// Header preceding every acknowledgement package.
pub const ACK_PACKAGE_HEADER_LENGTH: usize = 9;

/// Length prefix of the encoded oracle package list.
pub const ORACLE_PACKAGES_PREFIX_LENGTH: usize = 8;

/// Operation type of a "soul-bound token minted" acknowledgement.
pub const OPERATION_SBT_ACK_MINTED: u8 = 5;

/// Ack status reported by Chain A for a successful mint.
pub const ACK_STATUS_SUCCESS: u32 = 0;

/// Mirror status recorded on Chain B when the mint failed.
pub const MIRROR_STATUS_FAILED: u8 = 2;

/// Mirror status recorded on Chain B when the mint succeeded.
pub const MIRROR_STATUS_SUCCEEDED: u8 = 3;

/// The claim transaction carrying an aggregated proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Channel of the claimed entry.
    pub channel_id: ChannelId,
    /// Sequence of the claimed entry.
    pub sequence: u64,
    /// Raw payload the votes attest to.
    pub payload: Vec<u8>,
    /// Aggregated BLS signature.
    pub signature: BlsSignature,
    /// Roster positions behind the signature.
    pub bitset: ParticipantBitset,
    /// Unix seconds the source chain emitted the entry.
    pub tx_time: i64,
    /// Selector for the source chain.
    pub source: ClaimSourceChain,
}

/// One destination-chain call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionAction {
    /// Records the outcome of a soul-bound token mint.
    AckMinted {
        /// Chain the mint happened on.
        chain_id: u32,
        /// Recipient of the token.
        recipient: Address,
        /// Mirror status to record.
        status: u8,
    },
    /// Submits the aggregated claim.
    Claim(ClaimRequest),
}

impl SubmissionAction {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionAction::AckMinted { .. } => "ack_minted",
            SubmissionAction::Claim(_) => "claim",
        }
    }
}

/// A call plus its nonce offset within the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTransaction {
    /// Offset from the reserved base nonce.
    pub nonce_offset: u64,
    /// Call to make.
    pub action: SubmissionAction,
}

/// Ordered sub-transactions for one sequence. Always ends with the claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPlan {
    steps: Vec<SubTransaction>,
}

impl SubmissionPlan {
    /// Plan consisting of the claim alone.
    pub fn claim_only(claim: ClaimRequest) -> Self {
        Self::with_prelude(Vec::new(), claim)
    }

    /// Plan running `prelude` in order, then the claim.
    pub fn with_prelude(prelude: Vec<SubmissionAction>, claim: ClaimRequest) -> Self {
        let steps = prelude
            .into_iter()
            .chain(std::iter::once(SubmissionAction::Claim(claim)))
            .enumerate()
            .map(|(offset, action)| SubTransaction {
                nonce_offset: offset as u64,
                action,
            })
            .collect();
        Self { steps }
    }

    /// Sub-transactions in submission order.
    pub fn steps(&self) -> &[SubTransaction] {
        &self.steps
    }

    /// Nonces the plan consumes.
    pub fn nonce_count(&self) -> u64 {
        self.steps.len() as u64
    }
}

/// Turns a claim into the transactions that deliver it.
pub trait SubmissionPlanner: Send + Sync {
    /// Builds the plan for `claim`.
    fn plan(&self, claim: ClaimRequest) -> AssemblerResult<SubmissionPlan>;
}

/// Planner that always submits the claim alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimOnlyPlanner;

impl SubmissionPlanner for ClaimOnlyPlanner {
    fn plan(&self, claim: ClaimRequest) -> AssemblerResult<SubmissionPlan> {
        Ok(SubmissionPlan::claim_only(claim))
    }
}

/// Decoded "soul-bound token minted" acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbtMintedAck {
    /// Token recipients; the first one is acknowledged.
    pub recipients: Vec<Address>,
    /// Ack status reported by Chain A.
    pub status: u32,
}

impl SbtMintedAck {
    /// Status to mirror onto Chain B.
    pub fn mirror_status(&self) -> u8 {
        if self.status == ACK_STATUS_SUCCESS {
            MIRROR_STATUS_SUCCEEDED
        } else {
            MIRROR_STATUS_FAILED
        }
    }
}

/// Planner that prepends an ack-minted call to minted acknowledgements.
#[derive(Debug, Clone, Copy)]
pub struct AckMintedPlanner {
    chain_id: u32,
}

impl AckMintedPlanner {
    /// Create a planner for acknowledgements coming from `chain_id`.
    pub fn new(chain_id: u32) -> Self {
        Self { chain_id }
    }

    /// Extracts a minted acknowledgement from a claim payload, if it is one.
    pub fn decode_minted_ack(payload: &[u8]) -> AssemblerResult<Option<SbtMintedAck>> {
        let offset = ACK_PACKAGE_HEADER_LENGTH + ORACLE_PACKAGES_PREFIX_LENGTH;
        let Some((&operation, body)) = payload.get(offset..).and_then(|rest| rest.split_first())
        else {
            return Ok(None);
        };
        if operation != OPERATION_SBT_ACK_MINTED {
            return Ok(None);
        }
        decode_ack_tuple(body).map(Some)
    }
}

impl SubmissionPlanner for AckMintedPlanner {
    fn plan(&self, claim: ClaimRequest) -> AssemblerResult<SubmissionPlan> {
        let Some(ack) = Self::decode_minted_ack(&claim.payload)? else {
            return Ok(SubmissionPlan::claim_only(claim));
        };
        let recipient = *ack.recipients.first().ok_or_else(|| {
            AssemblerError::Plan(format!(
                "minted ack for sequence {} carries no recipient",
                claim.sequence
            ))
        })?;

        debug!(
            sequence = claim.sequence,
            recipient = %hex::encode(recipient),
            status = ack.mirror_status(),
            "[rl-04] Planning ack-minted call ahead of claim"
        );
        let ack_call = SubmissionAction::AckMinted {
            chain_id: self.chain_id,
            recipient,
            status: ack.mirror_status(),
        };
        Ok(SubmissionPlan::with_prelude(vec![ack_call], claim))
    }
}

sol! {
    /// Body of a minted acknowledgement as Chain A emits it.
    struct SbtAckPackage {
        address[] toAddrs;
        uint32 status;
    }
}

fn decode_ack_tuple(data: &[u8]) -> AssemblerResult<SbtMintedAck> {
    let package = SbtAckPackage::abi_decode(data)
        .map_err(|e| AssemblerError::Plan(format!("malformed minted ack: {e}")))?;
    Ok(SbtMintedAck {
        recipients: package.toAddrs.into_iter().map(|a| a.into_array()).collect(),
        status: package.status,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// ABI encoding of the ack body as Chain A emits it.
    pub(crate) fn encode_ack(recipients: &[Address], status: u32) -> Vec<u8> {
        SbtAckPackage {
            toAddrs: recipients.iter().copied().map(alloy_primitives::Address::from).collect(),
            status,
        }
        .abi_encode()
    }

    pub(crate) fn ack_payload(operation: u8, body: &[u8]) -> Vec<u8> {
        let mut payload = vec![0xee; ACK_PACKAGE_HEADER_LENGTH + ORACLE_PACKAGES_PREFIX_LENGTH];
        payload.push(operation);
        payload.extend_from_slice(body);
        payload
    }

    fn claim(payload: Vec<u8>) -> ClaimRequest {
        ClaimRequest {
            channel_id: ChannelId::ORACLE,
            sequence: 12,
            payload,
            signature: BlsSignature([0; 96]),
            bitset: ParticipantBitset::new(),
            tx_time: 1_700_000_000,
            source: ClaimSourceChain::Bsc,
        }
    }

    #[test]
    fn test_claim_only_plan() {
        let plan = ClaimOnlyPlanner.plan(claim(vec![1, 2, 3])).unwrap();
        assert_eq!(plan.nonce_count(), 1);
        assert_eq!(plan.steps()[0].nonce_offset, 0);
        assert_eq!(plan.steps()[0].action.kind(), "claim");
    }

    #[test]
    fn test_minted_ack_reserves_two_nonces() {
        let body = encode_ack(&[[0xaa; 20], [0xbb; 20]], ACK_STATUS_SUCCESS);
        let plan = AckMintedPlanner::new(56)
            .plan(claim(ack_payload(OPERATION_SBT_ACK_MINTED, &body)))
            .unwrap();

        assert_eq!(plan.nonce_count(), 2);
        assert_eq!(
            plan.steps()[0],
            SubTransaction {
                nonce_offset: 0,
                action: SubmissionAction::AckMinted {
                    chain_id: 56,
                    recipient: [0xaa; 20],
                    status: MIRROR_STATUS_SUCCEEDED,
                },
            }
        );
        assert_eq!(plan.steps()[1].nonce_offset, 1);
        assert_eq!(plan.steps()[1].action.kind(), "claim");
    }

    #[test]
    fn test_failed_mint_mirrors_failure() {
        let body = encode_ack(&[[0x01; 20]], 1);
        let ack = AckMintedPlanner::decode_minted_ack(&ack_payload(OPERATION_SBT_ACK_MINTED, &body))
            .unwrap()
            .unwrap();
        assert_eq!(ack.mirror_status(), MIRROR_STATUS_FAILED);
    }

    #[test]
    fn test_other_operations_are_claim_only() {
        let body = encode_ack(&[[0xaa; 20]], 0);
        let plan = AckMintedPlanner::new(56)
            .plan(claim(ack_payload(1, &body)))
            .unwrap();
        assert_eq!(plan.nonce_count(), 1);

        let plan = AckMintedPlanner::new(56).plan(claim(vec![0; 4])).unwrap();
        assert_eq!(plan.nonce_count(), 1);
    }

    #[test]
    fn test_decodes_chain_a_ack_layout() {
        let mut body = Vec::new();
        for word in [0x20u8, 0x40, 0x01, 0x01] {
            let mut padded = [0u8; 32];
            padded[31] = word;
            body.extend_from_slice(&padded);
        }
        let mut recipient = [0u8; 32];
        recipient[12..].copy_from_slice(&[0xcc; 20]);
        body.extend_from_slice(&recipient);
        assert_eq!(body, encode_ack(&[[0xcc; 20]], 1));

        let ack = AckMintedPlanner::decode_minted_ack(&ack_payload(OPERATION_SBT_ACK_MINTED, &body))
            .unwrap()
            .unwrap();
        assert_eq!(ack, SbtMintedAck { recipients: vec![[0xcc; 20]], status: 1 });
    }

    #[test]
    fn test_truncated_ack_is_rejected() {
        let body = encode_ack(&[[0xaa; 20]], 0);
        let payload = ack_payload(OPERATION_SBT_ACK_MINTED, &body[..body.len() - 5]);
        let err = AckMintedPlanner::new(56).plan(claim(payload)).unwrap_err();
        assert!(matches!(err, AssemblerError::Plan(_)));
    }

    #[test]
    fn test_ack_without_recipient_is_rejected() {
        let body = encode_ack(&[], 0);
        let payload = ack_payload(OPERATION_SBT_ACK_MINTED, &body);
        let err = AckMintedPlanner::new(56).plan(claim(payload)).unwrap_err();
        assert!(matches!(err, AssemblerError::Plan(_)));
    }
}
