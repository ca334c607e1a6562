//! # Consensus State Codec
//!
//! The light-client contract on Chain A stores its view of Chain B as a flat
//! byte string. Field widths and byte order are fixed by the contract.

use serde::{Deserialize, Serialize};
use shared_types::{BlsPublicKey, Hash, ValidatorRecord};

use super::errors::{LightClientError, LightClientResult};
use super::light_block::validator_set;

/// Width of the null-padded chain id field.
pub const CHAIN_ID_LENGTH: usize = 32;
/// Width of the height field.
pub const HEIGHT_LENGTH: usize = 8;
/// Width of the next validator set hash field.
pub const VALIDATOR_SET_HASH_LENGTH: usize = 32;
/// Width of a validator's ed25519 key.
pub const VALIDATOR_PUBKEY_LENGTH: usize = 32;
/// Width of a validator's voting power.
pub const VOTING_POWER_LENGTH: usize = 8;
/// Width of a relayer address.
pub const RELAYER_ADDRESS_LENGTH: usize = 20;
/// Width of a relayer BLS key.
pub const RELAYER_BLS_KEY_LENGTH: usize = 48;
/// Width of one encoded validator record.
pub const SINGLE_VALIDATOR_LENGTH: usize =
    VALIDATOR_PUBKEY_LENGTH + VOTING_POWER_LENGTH + RELAYER_ADDRESS_LENGTH + RELAYER_BLS_KEY_LENGTH;
/// Fixed prefix before the validator records.
pub const CONSENSUS_STATE_HEADER_LENGTH: usize =
    CHAIN_ID_LENGTH + HEIGHT_LENGTH + VALIDATOR_SET_HASH_LENGTH;

/// The light client's trusted view of Chain B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Chain B chain id.
    pub chain_id: String,
    /// Trusted height; only increases.
    pub height: u64,
    /// Hash of the set that must sign `height + 1`.
    pub next_validator_set_hash: Hash,
    /// Set that signed `height`, in canonical order, with relayer keys.
    pub validators: Vec<ValidatorRecord>,
}

impl ConsensusState {
    /// Parses the stored layout. Any number of validators is accepted.
    pub fn decode(input: &[u8]) -> LightClientResult<Self> {
        if input.len() < CONSENSUS_STATE_HEADER_LENGTH {
            return Err(LightClientError::MalformedState(format!(
                "{} bytes is shorter than the {CONSENSUS_STATE_HEADER_LENGTH}-byte header",
                input.len()
            )));
        }
        let body = &input[CONSENSUS_STATE_HEADER_LENGTH..];
        if body.len() % SINGLE_VALIDATOR_LENGTH != 0 {
            return Err(LightClientError::MalformedState(format!(
                "{} validator bytes is not a multiple of {SINGLE_VALIDATOR_LENGTH}",
                body.len()
            )));
        }

        let (chain_id_field, rest) = input.split_at(CHAIN_ID_LENGTH);
        let chain_id = std::str::from_utf8(trim_nulls(chain_id_field))
            .map_err(|_| LightClientError::MalformedState("chain id is not utf-8".into()))?
            .to_string();

        let (height_field, rest) = rest.split_at(HEIGHT_LENGTH);
        let height = u64::from_be_bytes(to_array(height_field));

        let next_validator_set_hash: Hash = to_array(&rest[..VALIDATOR_SET_HASH_LENGTH]);

        let validators = body
            .chunks_exact(SINGLE_VALIDATOR_LENGTH)
            .map(decode_validator)
            .collect::<LightClientResult<Vec<_>>>()?;

        Ok(Self {
            chain_id,
            height,
            next_validator_set_hash,
            validators,
        })
    }

    /// Parses a state that is about to have a block applied; it must name
    /// at least one validator.
    pub fn decode_validation_input(input: &[u8]) -> LightClientResult<Self> {
        let state = Self::decode(input)?;
        if state.validators.is_empty() {
            return Err(LightClientError::MalformedState(
                "consensus state has no validators".into(),
            ));
        }
        Ok(state)
    }

    /// Serializes into the stored layout.
    pub fn encode(&self) -> LightClientResult<Vec<u8>> {
        let chain_id = self.chain_id.as_bytes();
        if chain_id.len() > CHAIN_ID_LENGTH {
            return Err(LightClientError::MalformedState(format!(
                "chain id of {} bytes exceeds {CHAIN_ID_LENGTH}",
                chain_id.len()
            )));
        }

        let mut out = Vec::with_capacity(
            CONSENSUS_STATE_HEADER_LENGTH + self.validators.len() * SINGLE_VALIDATOR_LENGTH,
        );
        out.extend_from_slice(chain_id);
        out.resize(CHAIN_ID_LENGTH, 0);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.next_validator_set_hash);
        for validator in &self.validators {
            encode_validator(validator, &mut out);
        }
        Ok(out)
    }

    /// The stored validators as a CometBFT set, for commit verification.
    pub fn validator_set(&self) -> LightClientResult<tendermint::validator::Set> {
        validator_set(&self.validators)
    }
}

fn encode_validator(validator: &ValidatorRecord, out: &mut Vec<u8>) {
    out.extend_from_slice(&validator.consensus_pubkey);
    out.extend_from_slice(&validator.voting_power.to_be_bytes());
    out.extend_from_slice(&validator.relayer_address);
    out.extend_from_slice(validator.relayer_bls_key.as_bytes());
}

fn decode_validator(record: &[u8]) -> LightClientResult<ValidatorRecord> {
    let (pubkey, rest) = record.split_at(VALIDATOR_PUBKEY_LENGTH);
    let (power, rest) = rest.split_at(VOTING_POWER_LENGTH);
    let (address, bls) = rest.split_at(RELAYER_ADDRESS_LENGTH);
    let relayer_bls_key = BlsPublicKey::from_slice(bls)
        .ok_or_else(|| LightClientError::MalformedState("relayer bls key width".into()))?;

    Ok(ValidatorRecord {
        consensus_pubkey: to_array(pubkey),
        voting_power: u64::from_be_bytes(to_array(power)),
        relayer_address: to_array(address),
        relayer_bls_key,
    })
}

fn trim_nulls(field: &[u8]) -> &[u8] {
    let start = field.iter().position(|b| *b != 0).unwrap_or(field.len());
    let end = field.iter().rposition(|b| *b != 0).map_or(start, |i| i + 1);
    &field[start..end]
}

/// Copies a slice whose length the caller already checked.
fn to_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
