//! # Light Blocks
//!
//! A CometBFT signed header and the validator set that signed it, as fetched
//! from a Chain B node, plus the relayer keys registered for each validator.
//!
//! Header hashing, validator-set hashing and vote sign bytes all come from
//! the `tendermint` crate. The relayer keys are not part of the CometBFT
//! validator set; they only travel into the stored consensus state.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BlsPublicKey, Hash, ValidatorRecord};
use tendermint::block::signed_header::SignedHeader;
use tendermint::validator::{Info, Set};
use tendermint::{vote, PublicKey};

use super::errors::{LightClientError, LightClientResult};

/// Relayer identity registered for one Chain B validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerKeys {
    /// The validator's ed25519 consensus key.
    pub consensus_pubkey: [u8; 32],
    /// Chain A account the validator relays from.
    pub relayer_address: Address,
    /// BLS key the validator's relayer votes with.
    pub relayer_bls_key: BlsPublicKey,
}

impl From<&ValidatorRecord> for RelayerKeys {
    fn from(record: &ValidatorRecord) -> Self {
        Self {
            consensus_pubkey: record.consensus_pubkey,
            relayer_address: record.relayer_address,
            relayer_bls_key: record.relayer_bls_key,
        }
    }
}

/// Signed header, its validator set, and the relayer keys of that set.
#[derive(Debug, Clone)]
pub struct LightBlock {
    /// Header plus the commit that finalizes it.
    pub signed_header: SignedHeader,
    /// Set claimed to have signed the header.
    pub validators: Set,
    /// Relayer keys of `validators`, in any order.
    pub relayers: Vec<RelayerKeys>,
}

impl LightBlock {
    /// Height of the header.
    pub fn height(&self) -> u64 {
        self.signed_header.header.height.value()
    }

    /// Structural checks that need no trusted state.
    pub fn validate_basic(&self, chain_id: &str) -> LightClientResult<()> {
        let header = &self.signed_header.header;
        let commit = &self.signed_header.commit;

        if header.chain_id.as_str() != chain_id {
            return Err(LightClientError::ChainIdMismatch {
                expected: chain_id.to_string(),
                actual: header.chain_id.to_string(),
            });
        }
        if commit.height != header.height {
            return Err(LightClientError::InvalidCommit(format!(
                "commit height {} does not match header height {}",
                commit.height, header.height
            )));
        }
        if commit.block_id.hash != header.hash() {
            return Err(LightClientError::InvalidCommit(
                "commit signs a different header".into(),
            ));
        }
        if commit.signatures.is_empty() {
            return Err(LightClientError::InvalidCommit("no signatures".into()));
        }
        if self.validators.validators().is_empty() {
            return Err(LightClientError::InvalidBlock("empty validator set".into()));
        }
        if self.validators.hash() != header.validators_hash {
            return Err(LightClientError::InvalidBlock(
                "validator set does not match header validators hash".into(),
            ));
        }
        Ok(())
    }

    /// The block's validators as stored records, in canonical set order.
    ///
    /// Relayer keys come from the block, falling back to `previous` for
    /// validators that carried over from the trusted set.
    pub fn validator_records(&self, previous: &[ValidatorRecord]) -> LightClientResult<Vec<ValidatorRecord>> {
        self.validators
            .validators()
            .iter()
            .map(|info| {
                let consensus_pubkey = ed25519_bytes(info)?;
                let keys = self
                    .relayers
                    .iter()
                    .copied()
                    .find(|r| r.consensus_pubkey == consensus_pubkey)
                    .or_else(|| {
                        previous
                            .iter()
                            .find(|v| v.consensus_pubkey == consensus_pubkey)
                            .map(RelayerKeys::from)
                    })
                    .ok_or_else(|| {
                        LightClientError::InvalidBlock(format!(
                            "no relayer keys for validator {}",
                            info.address
                        ))
                    })?;
                Ok(ValidatorRecord {
                    consensus_pubkey,
                    voting_power: info.power.value(),
                    relayer_address: keys.relayer_address,
                    relayer_bls_key: keys.relayer_bls_key,
                })
            })
            .collect()
    }
}

/// CometBFT validator set of stored records.
pub fn validator_set(records: &[ValidatorRecord]) -> LightClientResult<Set> {
    let validators = records
        .iter()
        .map(|record| {
            let key = PublicKey::from_raw_ed25519(&record.consensus_pubkey).ok_or_else(|| {
                LightClientError::MalformedState(format!(
                    "validator key {} is not ed25519",
                    hex::encode(record.consensus_pubkey)
                ))
            })?;
            let power = vote::Power::try_from(record.voting_power).map_err(|e| {
                LightClientError::MalformedState(format!("voting power {}: {e}", record.voting_power))
            })?;
            Ok(Info::new(key, power))
        })
        .collect::<LightClientResult<Vec<_>>>()?;
    Ok(Set::without_proposer(validators))
}

/// Raw bytes of a SHA-256 CometBFT hash.
pub fn hash_bytes(hash: &tendermint::Hash) -> LightClientResult<Hash> {
    Hash::try_from(hash.as_bytes())
        .map_err(|_| LightClientError::InvalidBlock(format!("expected a sha256 hash, got {hash}")))
}

fn ed25519_bytes(info: &Info) -> LightClientResult<[u8; 32]> {
    let bytes = info.pub_key.to_bytes();
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        LightClientError::InvalidBlock(format!("validator {} key is not ed25519", info.address))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestChain;

    const CHAIN: &str = "chain-b_1017-1";

    #[test]
    fn test_records_convert_to_the_header_set() {
        let chain = TestChain::new(CHAIN, &[1, 2, 3], 10);
        let set = validator_set(&chain.records()).unwrap();
        let block = chain.light_block(5, &chain.validator_set());
        assert_eq!(set.hash(), block.signed_header.header.validators_hash);
        block.validate_basic(CHAIN).unwrap();
    }

    #[test]
    fn test_swapped_validator_set_fails_basic_checks() {
        let chain = TestChain::new(CHAIN, &[1, 2, 3], 10);
        let other = TestChain::new(CHAIN, &[4, 5, 6], 10);
        let mut block = chain.light_block(5, &chain.validator_set());
        block.validators = other.validator_set();
        assert!(matches!(block.validate_basic(CHAIN), Err(LightClientError::InvalidBlock(_))));
    }

    #[test]
    fn test_relayer_keys_fall_back_to_trusted_records() {
        let chain = TestChain::new(CHAIN, &[1, 2, 3], 10);
        let mut block = chain.light_block(5, &chain.validator_set());
        let dropped = block.relayers.remove(0);

        assert!(matches!(block.validator_records(&[]), Err(LightClientError::InvalidBlock(_))));

        let records = block.validator_records(&chain.records()).unwrap();
        assert_eq!(records, chain.records());
        assert!(records.iter().any(|r| r.consensus_pubkey == dropped.consensus_pubkey));
    }
}
