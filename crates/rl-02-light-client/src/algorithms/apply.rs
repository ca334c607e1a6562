//! # Header Application
//!
//! Advances a consensus state by one light block and builds the payload the
//! light-client contract accepts.

use crate::domain::{
    hash_bytes, ConsensusState, LightBlock, LightClientError, LightClientResult, TrustThreshold,
};

use super::commit_verifier::{verify_commit_light, verify_commit_light_trusting};

/// Reserved prefix of the sync payload: flag byte plus zero padding.
pub const VALIDATION_RESULT_METADATA_LENGTH: usize = 32;

const LENGTH_FIELD: usize = 8;

/// Verifies `block` against `state` and, on success, moves `state` to it.
///
/// Returns whether the signing validator set differs from the one previously
/// stored. On any error `state` is left untouched.
pub fn apply_light_block(
    state: &mut ConsensusState,
    block: &LightBlock,
    trust: TrustThreshold,
) -> LightClientResult<bool> {
    let height = block.height();
    if height <= state.height {
        return Err(LightClientError::StaleBlock {
            block_height: height,
            trusted_height: state.height,
        });
    }

    block.validate_basic(&state.chain_id)?;

    let header = &block.signed_header.header;
    let trusted_set = state.validator_set()?;

    if height == state.height + 1 {
        let signed_by = hash_bytes(&header.validators_hash)?;
        if signed_by != state.next_validator_set_hash {
            return Err(LightClientError::ValidatorSetHashMismatch {
                expected: hex::encode(state.next_validator_set_hash),
                actual: hex::encode(signed_by),
            });
        }
        verify_commit_light(&block.validators, &block.signed_header)?;
    } else {
        // Trusted set first: bounds the work an attacker-supplied set can cause.
        verify_commit_light_trusting(&trusted_set, &block.signed_header, trust)?;
        verify_commit_light(&block.validators, &block.signed_header)?;
    }

    let validator_set_changed = trusted_set.hash() != header.validators_hash;
    let next_validator_set_hash = hash_bytes(&header.next_validators_hash)?;
    let validators = block.validator_records(&state.validators)?;

    state.height = height;
    state.next_validator_set_hash = next_validator_set_hash;
    state.validators = validators;

    Ok(validator_set_changed)
}

/// Wraps encoded consensus state bytes for the contract:
/// `changed[1] | zero[23] | len[8] | state`.
pub fn encode_validation_result(validator_set_changed: bool, consensus_state: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(VALIDATION_RESULT_METADATA_LENGTH + consensus_state.len());
    out.push(u8::from(validator_set_changed));
    out.resize(VALIDATION_RESULT_METADATA_LENGTH - LENGTH_FIELD, 0);
    out.extend_from_slice(&(consensus_state.len() as u64).to_be_bytes());
    out.extend_from_slice(consensus_state);
    out
}
