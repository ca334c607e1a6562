//! In-memory stand-ins for the Chain B node and the Chain A contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ChainError, ChainResult, TxHash};

use crate::algorithms::VALIDATION_RESULT_METADATA_LENGTH;
use crate::domain::{ConsensusState, LightBlock, LightClientResult};
use crate::ports::outbound::{LightBlockSource, LightClientContract};

/// Serves pre-built light blocks by height.
#[derive(Default)]
pub struct MockLightBlockSource {
    blocks: RwLock<HashMap<u64, LightBlock>>,
    should_fail: AtomicBool,
}

impl MockLightBlockSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the block at its height.
    pub fn insert(&self, block: LightBlock) {
        self.blocks.write().insert(block.height(), block);
    }

    /// Makes every query fail with a transient error.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LightBlockSource for MockLightBlockSource {
    async fn query_light_block(&self, height: u64) -> ChainResult<LightBlock> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transient("node unreachable".into()));
        }
        self.blocks
            .read()
            .get(&height)
            .cloned()
            .ok_or_else(|| ChainError::Transient(format!("no light block at height {height}")))
    }
}

/// Contract that stores whatever state a well-formed sync payload carries.
pub struct InMemoryLightClientContract {
    state: RwLock<Vec<u8>>,
    submissions: RwLock<Vec<(u64, Vec<u8>)>>,
}

impl InMemoryLightClientContract {
    /// Starts from an encoded trusted state.
    pub fn new(initial: &ConsensusState) -> LightClientResult<Self> {
        Ok(Self {
            state: RwLock::new(initial.encode()?),
            submissions: RwLock::new(Vec::new()),
        })
    }

    /// Replaces the stored bytes verbatim.
    pub fn overwrite_state(&self, bytes: Vec<u8>) {
        *self.state.write() = bytes;
    }

    /// Accepted `(height, payload)` submissions, oldest first.
    pub fn submissions(&self) -> Vec<(u64, Vec<u8>)> {
        self.submissions.read().clone()
    }
}

#[async_trait]
impl LightClientContract for InMemoryLightClientContract {
    async fn consensus_state_bytes(&self) -> ChainResult<Vec<u8>> {
        Ok(self.state.read().clone())
    }

    async fn latest_height(&self) -> ChainResult<u64> {
        let bytes = self.state.read().clone();
        ConsensusState::decode(&bytes)
            .map(|cs| cs.height)
            .map_err(|e| ChainError::Rejected {
                code: 1,
                log: e.to_string(),
            })
    }

    async fn sync_light_block(&self, validation_result: Vec<u8>, height: u64) -> ChainResult<TxHash> {
        let reject = |log: String| ChainError::Rejected { code: 2, log };

        if validation_result.len() < VALIDATION_RESULT_METADATA_LENGTH {
            return Err(reject("payload shorter than metadata".into()));
        }
        let mut len_field = [0u8; 8];
        len_field.copy_from_slice(&validation_result[24..VALIDATION_RESULT_METADATA_LENGTH]);
        let len = u64::from_be_bytes(len_field) as usize;
        let state = validation_result
            .get(VALIDATION_RESULT_METADATA_LENGTH..VALIDATION_RESULT_METADATA_LENGTH + len)
            .ok_or_else(|| reject("length field exceeds payload".into()))?;
        let decoded = ConsensusState::decode(state).map_err(|e| reject(e.to_string()))?;
        if decoded.height != height {
            return Err(reject(format!("payload height {} != {height}", decoded.height)));
        }

        *self.state.write() = state.to_vec();
        let mut submissions = self.submissions.write();
        submissions.push((height, validation_result));
        Ok(TxHash(format!("0x{:064x}", submissions.len())))
    }
}
