//! # Light Client Syncer
//!
//! Fetches a light block, verifies it against the state stored in the Chain A
//! contract, and submits the re-encoded state.
//!
//! ## Halting
//!
//! A verification failure means either the contract state or the Chain B
//! node is inconsistent with what was signed. With
//! `halt_on_verification_failure`, the syncer latches the first such failure
//! and refuses further syncs until `resume` is called.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{with_retry, RetryConfig, TxHash};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::algorithms::{apply_light_block, encode_validation_result};
use crate::config::LightClientConfig;
use crate::domain::{ConsensusState, LightBlock, LightClientError, LightClientResult};
use crate::ports::inbound::LightClientApi;
use crate::ports::outbound::{LightBlockSource, LightClientContract};

/// Drives the Chain A light client of Chain B forward.
pub struct LightClientSyncer<B: LightBlockSource, C: LightClientContract> {
    source: Arc<B>,
    contract: Arc<C>,
    config: LightClientConfig,
    halted: RwLock<Option<String>>,
    /// Serializes syncs so concurrent callers do not submit the same header.
    sync_lock: Mutex<()>,
}

impl<B: LightBlockSource, C: LightClientContract> LightClientSyncer<B, C> {
    /// Create a new syncer.
    pub fn new(source: Arc<B>, contract: Arc<C>, config: LightClientConfig) -> Self {
        Self {
            source,
            contract,
            config,
            halted: RwLock::new(None),
            sync_lock: Mutex::new(()),
        }
    }

    /// Verifies the header at `height` and submits it to the contract.
    pub async fn sync_light_block(&self, height: u64) -> LightClientResult<TxHash> {
        let _guard = self.sync_lock.lock().await;
        self.sync_locked(height).await
    }

    /// Pure half of a sync: decode, apply, re-encode.
    ///
    /// Returns the contract payload and whether the validator set changed.
    pub fn build_sync_payload(
        &self,
        stored_state: &[u8],
        block: &LightBlock,
    ) -> LightClientResult<(Vec<u8>, bool)> {
        let mut state = ConsensusState::decode_validation_input(stored_state)?;
        if state.chain_id != self.config.chain_id {
            return Err(LightClientError::ChainIdMismatch {
                expected: self.config.chain_id.clone(),
                actual: state.chain_id,
            });
        }
        let changed = apply_light_block(&mut state, block, self.config.trust_threshold)?;
        let encoded = state.encode()?;
        Ok((encode_validation_result(changed, &encoded), changed))
    }

    /// Clears a latched halt.
    pub fn resume(&self) {
        if let Some(reason) = self.halted.write().take() {
            info!(%reason, "[rl-02] Light client sync resumed by operator");
        }
    }

    /// Reason for the current halt, if any.
    pub fn halt_reason(&self) -> Option<String> {
        self.halted.read().clone()
    }

    async fn sync_locked(&self, height: u64) -> LightClientResult<TxHash> {
        if let Some(reason) = self.halt_reason() {
            return Err(LightClientError::Halted { reason });
        }

        let source = self.source.clone();
        let block = with_retry(&self.config.retry, "query_light_block", || {
            let source = source.clone();
            async move { source.query_light_block(height).await }
        })
        .await?;

        let contract = self.contract.clone();
        let stored = with_retry(&self.config.retry, "consensus_state_bytes", || {
            let contract = contract.clone();
            async move { contract.consensus_state_bytes().await }
        })
        .await?;

        let (payload, changed) = match self.build_sync_payload(&stored, &block) {
            Ok(result) => result,
            Err(e) => {
                if e.is_verification_failure() && self.config.halt_on_verification_failure {
                    *self.halted.write() = Some(e.to_string());
                    error!(height, error = %e, "[rl-02] Light block rejected, sync halted");
                }
                return Err(e);
            }
        };

        let submit_policy = RetryConfig {
            attempts: 1,
            ..self.config.retry.clone()
        };
        let contract = self.contract.clone();
        let tx_hash = with_retry(&submit_policy, "sync_light_block", || {
            let contract = contract.clone();
            let payload = payload.clone();
            async move { contract.sync_light_block(payload, height).await }
        })
        .await?;

        info!(
            height,
            validator_set_changed = changed,
            tx_hash = %tx_hash,
            "[rl-02] Light block synced"
        );
        Ok(tx_hash)
    }
}

#[async_trait]
impl<B: LightBlockSource, C: LightClientContract> LightClientApi for LightClientSyncer<B, C> {
    async fn ensure_synced(&self, height: u64) -> LightClientResult<Option<TxHash>> {
        let _guard = self.sync_lock.lock().await;

        let contract = self.contract.clone();
        let trusted = with_retry(&self.config.retry, "light_client_height", || {
            let contract = contract.clone();
            async move { contract.latest_height().await }
        })
        .await?;

        if trusted >= height {
            debug!(height, trusted, "[rl-02] Light client already past height");
            return Ok(None);
        }
        self.sync_locked(height).await.map(Some)
    }

    fn is_halted(&self) -> bool {
        self.halted.read().is_some()
    }
}
