//! In-memory chains.
//!
//! `InMemoryDestinationLedger` models the state a destination chain enforces
//! for claims: one nonce per relayer account and one delivery cursor per
//! channel. Several relayers share a ledger through their own
//! `DestinationClient`, so races between them surface as real conflicts.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BlsPublicKey, ChainError, ChainResult, ChannelId, InturnRelayer, TxHash};

use crate::domain::{ClaimSourceChain, SubmissionAction};
use crate::ports::outbound::{DestinationChain, SourceChain};

/// A transaction the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedSubmission {
    /// Account that signed it.
    pub account: BlsPublicKey,
    /// Nonce it consumed.
    pub nonce: u64,
    /// What it did.
    pub action: SubmissionAction,
    /// Hash the ledger assigned.
    pub tx_hash: TxHash,
}

#[derive(Default)]
struct LedgerState {
    inturn: Option<InturnRelayer>,
    next_delivery: HashMap<ChannelId, u64>,
    nonces: HashMap<BlsPublicKey, u64>,
    accepted: Vec<AcceptedSubmission>,
    scripted_failures: VecDeque<ChainError>,
    tx_counter: u64,
}

/// Destination chain state shared by every relayer client.
#[derive(Default)]
pub struct InMemoryDestinationLedger {
    state: Mutex<LedgerState>,
    queries_fail: AtomicBool,
    delivery_queries: AtomicUsize,
    nonce_queries: AtomicUsize,
}

impl InMemoryDestinationLedger {
    /// Create a ledger with no in-turn relayer and every cursor at zero.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Client signing as `account`.
    pub fn client(self: &Arc<Self>, account: BlsPublicKey) -> DestinationClient {
        DestinationClient {
            ledger: self.clone(),
            account,
        }
    }

    /// Sets the relayer governance reports as in turn.
    pub fn set_inturn(&self, inturn: InturnRelayer) {
        self.state.lock().inturn = Some(inturn);
    }

    /// Sets the next sequence the ledger accepts on a channel.
    pub fn set_next_delivery(&self, channel_id: ChannelId, sequence: u64) {
        self.state.lock().next_delivery.insert(channel_id, sequence);
    }

    /// Next sequence the ledger accepts on a channel.
    pub fn next_delivery(&self, channel_id: ChannelId) -> u64 {
        self.state.lock().next_delivery.get(&channel_id).copied().unwrap_or(0)
    }

    /// Sets an account's next nonce.
    pub fn set_nonce(&self, account: BlsPublicKey, nonce: u64) {
        self.state.lock().nonces.insert(account, nonce);
    }

    /// An account's next nonce.
    pub fn nonce(&self, account: &BlsPublicKey) -> u64 {
        self.state.lock().nonces.get(account).copied().unwrap_or(0)
    }

    /// Fails the next submission with `error` without consuming anything.
    pub fn fail_next_submission(&self, error: ChainError) {
        self.state.lock().scripted_failures.push_back(error);
    }

    /// Makes every query fail with a transient error.
    pub fn set_queries_fail(&self, fail: bool) {
        self.queries_fail.store(fail, Ordering::SeqCst);
    }

    /// Transactions accepted so far, in order.
    pub fn accepted(&self) -> Vec<AcceptedSubmission> {
        self.state.lock().accepted.clone()
    }

    /// Number of delivery-cursor queries served.
    pub fn delivery_queries(&self) -> usize {
        self.delivery_queries.load(Ordering::SeqCst)
    }

    /// Number of account-nonce queries served.
    pub fn nonce_queries(&self) -> usize {
        self.nonce_queries.load(Ordering::SeqCst)
    }

    fn check_queries(&self) -> ChainResult<()> {
        if self.queries_fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transient("node unavailable".to_string()));
        }
        Ok(())
    }

    fn submit_as(&self, account: BlsPublicKey, action: &SubmissionAction, nonce: u64) -> ChainResult<TxHash> {
        let mut state = self.state.lock();
        if let Some(error) = state.scripted_failures.pop_front() {
            return Err(error);
        }

        let expected_nonce = state.nonces.get(&account).copied().unwrap_or(0);
        if nonce != expected_nonce {
            return Err(ChainError::NonceConflict(format!(
                "account sequence mismatch, expected {expected_nonce}, got {nonce}"
            )));
        }
        if let SubmissionAction::Claim(claim) = action {
            let expected = state.next_delivery.get(&claim.channel_id).copied().unwrap_or(0);
            if claim.sequence != expected {
                return Err(ChainError::SequenceConflict(format!(
                    "channel {} expects sequence {expected}, got {}",
                    claim.channel_id, claim.sequence
                )));
            }
            state.next_delivery.insert(claim.channel_id, expected + 1);
        }

        state.nonces.insert(account, expected_nonce + 1);
        state.tx_counter += 1;
        let tx_hash = TxHash(format!("0x{:064x}", state.tx_counter));
        state.accepted.push(AcceptedSubmission {
            account,
            nonce,
            action: action.clone(),
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }
}

/// One relayer's connection to a shared ledger.
#[derive(Clone)]
pub struct DestinationClient {
    ledger: Arc<InMemoryDestinationLedger>,
    account: BlsPublicKey,
}

impl DestinationClient {
    /// Ledger behind this client.
    pub fn ledger(&self) -> &Arc<InMemoryDestinationLedger> {
        &self.ledger
    }
}

#[async_trait]
impl DestinationChain for DestinationClient {
    async fn inturn_relayer(&self, _source: ClaimSourceChain) -> ChainResult<InturnRelayer> {
        self.ledger.check_queries()?;
        self.ledger
            .state
            .lock()
            .inturn
            .clone()
            .ok_or_else(|| ChainError::Rejected {
                code: 404,
                log: "no in-turn relayer registered".to_string(),
            })
    }

    async fn next_delivery_sequence(&self, channel_id: ChannelId) -> ChainResult<u64> {
        self.ledger.check_queries()?;
        self.ledger.delivery_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.ledger.next_delivery(channel_id))
    }

    async fn account_nonce(&self) -> ChainResult<u64> {
        self.ledger.check_queries()?;
        self.ledger.nonce_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.ledger.nonce(&self.account))
    }

    async fn account_nonce_on_next_block(&self) -> ChainResult<u64> {
        self.account_nonce().await
    }

    async fn submit(&self, action: &SubmissionAction, nonce: u64) -> ChainResult<TxHash> {
        self.ledger.submit_as(self.account, action, nonce)
    }
}

/// Source chain exposing per-channel send cursors.
#[derive(Default)]
pub struct MockSourceChain {
    next_send: Mutex<HashMap<ChannelId, u64>>,
    should_fail: AtomicBool,
}

impl MockSourceChain {
    /// Create a source with every cursor at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the next sequence the source will emit on a channel.
    pub fn set_next_send(&self, channel_id: ChannelId, sequence: u64) {
        self.next_send.lock().insert(channel_id, sequence);
    }

    /// Makes queries fail with a transient error.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SourceChain for MockSourceChain {
    async fn next_send_sequence(&self, channel_id: ChannelId) -> ChainResult<u64> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transient("source node unavailable".to_string()));
        }
        Ok(self.next_send.lock().get(&channel_id).copied().unwrap_or(0))
    }
}
