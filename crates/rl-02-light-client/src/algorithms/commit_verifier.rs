//! # Commit Verification
//!
//! Tallies precommit signatures with the CometBFT light-client verifier's
//! voting-power calculator: sign bytes are the canonical-vote protobuf
//! encoding, signers are matched by address, and nil or absent votes count
//! for nothing.

use tendermint::block::signed_header::SignedHeader;
use tendermint::validator::Set;
use tendermint_light_client_verifier::errors::{VerificationError, VerificationErrorDetail};
use tendermint_light_client_verifier::operations::{ProdVotingPowerCalculator, VotingPowerCalculator};

use crate::domain::{LightClientError, LightClientResult, TrustThreshold};

/// Verifies that more than 2/3 of `validators`' power signed the header.
///
/// The commit must carry one slot per member of `validators`.
pub fn verify_commit_light(validators: &Set, signed_header: &SignedHeader) -> LightClientResult<()> {
    let slots = signed_header.commit.signatures.len();
    let members = validators.validators().len();
    if slots != members {
        return Err(LightClientError::InvalidCommit(format!(
            "{slots} signatures for {members} validators"
        )));
    }
    tally(validators, signed_header, TrustThreshold::TWO_THIRDS)
}

/// Verifies that more than `trust` of a previously trusted set's power signed
/// the header. Signers unknown to the trusted set are skipped.
pub fn verify_commit_light_trusting(
    trusted: &Set,
    signed_header: &SignedHeader,
    trust: TrustThreshold,
) -> LightClientResult<()> {
    tally(trusted, signed_header, trust)
}

fn tally(set: &Set, signed_header: &SignedHeader, threshold: TrustThreshold) -> LightClientResult<()> {
    let power = ProdVotingPowerCalculator::default()
        .voting_power_in(signed_header, set, threshold.to_fraction()?)
        .map_err(verification_error)?;

    if threshold.is_enough_power(power.tallied, power.total) {
        return Ok(());
    }
    Err(LightClientError::NotEnoughVotingPower {
        tallied: power.tallied as u128,
        needed: threshold.required_power(power.total as u128),
    })
}

fn verification_error(e: VerificationError) -> LightClientError {
    match e.detail() {
        VerificationErrorDetail::InvalidSignature(_) => LightClientError::InvalidSignature {
            validator: e.to_string(),
        },
        VerificationErrorDetail::DuplicateValidator(_) => LightClientError::DoubleVote {
            validator: e.to_string(),
        },
        _ => LightClientError::InvalidCommit(e.to_string()),
    }
}
