//! # Test Fixtures
//!
//! Deterministic Chain B validator keys and CometBFT light blocks signed
//! over real canonical-vote bytes.

use ed25519_dalek::{Signer, SigningKey};
use shared_types::{BlsPublicKey, Hash, ValidatorRecord};
use tendermint::block::{parts::Header as PartSetHeader, Commit, Header, Id as BlockId, signed_header::SignedHeader};
use tendermint::chain::Id as ChainId;
use tendermint::validator::Set;
use tendermint::vote::{Type as VoteType, ValidatorIndex, Vote};
use tendermint_proto::google::protobuf::Timestamp;
use tendermint_proto::types::{
    BlockId as RawBlockId, Commit as RawCommit, CommitSig as RawCommitSig, Header as RawHeader,
    PartSetHeader as RawPartSetHeader,
};

use crate::domain::{hash_bytes, validator_set, ConsensusState, LightBlock, RelayerKeys};

const BLOCK_ID_FLAG_ABSENT: i32 = 1;
const BLOCK_ID_FLAG_COMMIT: i32 = 2;

/// A chain whose validators are derived from single-byte seeds.
///
/// Keys and records are held in canonical set order, so signer indices
/// passed to [`TestChain::light_block_signed_by`] are set positions.
pub struct TestChain {
    chain_id: String,
    keys: Vec<SigningKey>,
    records: Vec<ValidatorRecord>,
}

impl TestChain {
    /// One validator per seed, each with `power`.
    pub fn new(chain_id: &str, seeds: &[u8], power: u64) -> Self {
        let members: Vec<(SigningKey, ValidatorRecord)> = seeds
            .iter()
            .map(|seed| {
                let key = SigningKey::from_bytes(&[*seed; 32]);
                let record = ValidatorRecord {
                    consensus_pubkey: key.verifying_key().to_bytes(),
                    voting_power: power,
                    relayer_address: [*seed; 20],
                    relayer_bls_key: BlsPublicKey([*seed; 48]),
                };
                (key, record)
            })
            .collect();

        let records: Vec<ValidatorRecord> = members.iter().map(|(_, r)| r.clone()).collect();
        let set = validator_set(&records).expect("fixture validators");
        let (keys, records) = set
            .validators()
            .iter()
            .map(|info| {
                let pubkey = info.pub_key.to_bytes();
                members
                    .iter()
                    .find(|(_, r)| r.consensus_pubkey.as_slice() == pubkey.as_slice())
                    .cloned()
                    .expect("member of the fixture set")
            })
            .unzip();

        Self {
            chain_id: chain_id.to_string(),
            keys,
            records,
        }
    }

    /// The chain id blocks are produced for.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Validators with relayer keys, in canonical set order.
    pub fn records(&self) -> Vec<ValidatorRecord> {
        self.records.clone()
    }

    /// Current validator set.
    pub fn validator_set(&self) -> Set {
        validator_set(&self.records).expect("fixture validators")
    }

    /// Hash of the current validator set.
    pub fn validator_set_hash(&self) -> Hash {
        hash_bytes(&self.validator_set().hash()).expect("sha256 set hash")
    }

    /// A trusted state at `height` that expects this set to sign `height + 1`.
    pub fn consensus_state(&self, height: u64) -> ConsensusState {
        ConsensusState {
            chain_id: self.chain_id.clone(),
            height,
            next_validator_set_hash: self.validator_set_hash(),
            validators: self.records(),
        }
    }

    /// A block at `height` signed by every validator.
    pub fn light_block(&self, height: u64, next: &Set) -> LightBlock {
        let all: Vec<usize> = (0..self.keys.len()).collect();
        self.light_block_signed_by(height, next, &all)
    }

    /// A block at `height` signed only by the validators at `signers`.
    pub fn light_block_signed_by(&self, height: u64, next: &Set, signers: &[usize]) -> LightBlock {
        let set = self.validator_set();
        let time = Timestamp {
            seconds: 1_700_000_000 + height as i64,
            nanos: 0,
        };
        let header: Header = RawHeader {
            version: Some(tendermint_proto::version::Consensus { block: 11, app: 0 }),
            chain_id: self.chain_id.clone(),
            height: height as i64,
            time: Some(time.clone()),
            validators_hash: set.hash().as_bytes().to_vec(),
            next_validators_hash: next.hash().as_bytes().to_vec(),
            app_hash: vec![0xa5; 32],
            proposer_address: vec![0; 20],
            ..Default::default()
        }
        .try_into()
        .expect("fixture header");

        let header_hash = header.hash();
        let part_set_header = PartSetHeader::new(1, header_hash).expect("part set header");
        let block_id = BlockId {
            hash: header_hash,
            part_set_header,
        };
        let chain_id = ChainId::try_from(self.chain_id.clone()).expect("chain id");

        let signatures = self
            .keys
            .iter()
            .zip(set.validators())
            .enumerate()
            .map(|(idx, (key, info))| {
                if !signers.contains(&idx) {
                    return RawCommitSig {
                        block_id_flag: BLOCK_ID_FLAG_ABSENT,
                        ..Default::default()
                    };
                }
                let vote = Vote {
                    vote_type: VoteType::Precommit,
                    height: header.height,
                    round: 0u16.into(),
                    block_id: Some(block_id.clone()),
                    timestamp: Some(header.time),
                    validator_address: info.address,
                    validator_index: ValidatorIndex::try_from(idx as u32).expect("index"),
                    signature: Default::default(),
                    extension: Default::default(),
                    extension_signature: Default::default(),
                };
                let mut sign_bytes = Vec::new();
                vote.to_signable_bytes(chain_id.clone(), &mut sign_bytes)
                    .expect("canonical vote bytes");
                RawCommitSig {
                    block_id_flag: BLOCK_ID_FLAG_COMMIT,
                    validator_address: info.address.as_bytes().to_vec(),
                    timestamp: Some(time.clone()),
                    signature: key.sign(&sign_bytes).to_bytes().to_vec(),
                }
            })
            .collect();

        let commit: Commit = RawCommit {
            height: height as i64,
            round: 0,
            block_id: Some(RawBlockId {
                hash: header_hash.as_bytes().to_vec(),
                part_set_header: Some(RawPartSetHeader::from(part_set_header)),
            }),
            signatures,
        }
        .try_into()
        .expect("fixture commit");

        LightBlock {
            signed_header: SignedHeader::new(header, commit).expect("signed header"),
            validators: set,
            relayers: self.records.iter().map(RelayerKeys::from).collect(),
        }
    }
}
