//! In-memory relay store.
//!
//! Stands in for the relational store the listener and voting pipeline
//! write to. Status updates are all-or-nothing and never move an entry
//! backwards.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ChannelId, RelayEntry, RelayStatus, TxHash, Vote};

use crate::error::{StoreError, StoreResult};
use crate::ports::outbound::RelayStore;

#[derive(Default)]
struct StoreInner {
    entries: BTreeMap<i64, RelayEntry>,
    votes: HashMap<(ChannelId, u64), Vec<Vote>>,
    next_id: i64,
    should_fail: bool,
}

/// Relay store held in memory.
#[derive(Default)]
pub struct InMemoryRelayStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryRelayStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists `entry` under a fresh id and returns the id.
    pub fn save_entry(&self, mut entry: RelayEntry) -> i64 {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        entry.id = inner.next_id;
        inner.entries.insert(entry.id, entry);
        inner.next_id
    }

    /// Persists a vote.
    pub fn save_vote(&self, vote: Vote) {
        self.inner
            .write()
            .votes
            .entry((vote.channel_id, vote.sequence))
            .or_default()
            .push(vote);
    }

    /// Moves every entry at `(channel_id, sequence)` to `status`.
    pub fn set_status(&self, channel_id: ChannelId, sequence: u64, status: RelayStatus) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let ids: Vec<i64> = inner
            .entries
            .values()
            .filter(|e| e.channel_id == channel_id && e.sequence == sequence)
            .map(|e| e.id)
            .collect();
        apply_update(&mut inner, &ids, Some(status), None)
    }

    /// Entry by id.
    pub fn entry(&self, id: i64) -> Option<RelayEntry> {
        self.inner.read().entries.get(&id).cloned()
    }

    /// Snapshot of the entries at `(channel_id, sequence)`.
    pub fn entries_at(&self, channel_id: ChannelId, sequence: u64) -> Vec<RelayEntry> {
        self.inner
            .read()
            .entries
            .values()
            .filter(|e| e.channel_id == channel_id && e.sequence == sequence)
            .cloned()
            .collect()
    }

    /// Makes every port call fail with a backend error.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().should_fail = should_fail;
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.inner.read().should_fail {
            return Err(StoreError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

/// Validates every id first, then applies the update to all of them.
fn apply_update(
    inner: &mut StoreInner,
    ids: &[i64],
    status: Option<RelayStatus>,
    tx_hash: Option<&TxHash>,
) -> StoreResult<()> {
    for id in ids {
        let entry = inner.entries.get(id).ok_or(StoreError::UnknownEntry(*id))?;
        if let Some(next) = status {
            if !entry.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id: *id,
                    from: entry.status,
                    to: next,
                });
            }
        }
    }
    for id in ids {
        if let Some(entry) = inner.entries.get_mut(id) {
            if let Some(next) = status {
                entry.status = next;
            }
            if let Some(hash) = tx_hash {
                entry.claimed_tx_hash = Some(hash.clone());
            }
        }
    }
    Ok(())
}

#[async_trait]
impl RelayStore for InMemoryRelayStore {
    async fn entries_by_channel_and_sequence(
        &self,
        channel_id: ChannelId,
        sequence: u64,
    ) -> StoreResult<Vec<RelayEntry>> {
        self.check_available()?;
        Ok(self.entries_at(channel_id, sequence))
    }

    async fn latest_sequence_by_status(
        &self,
        channel_id: ChannelId,
        status: RelayStatus,
    ) -> StoreResult<Option<u64>> {
        self.check_available()?;
        Ok(self
            .inner
            .read()
            .entries
            .values()
            .filter(|e| e.channel_id == channel_id && e.status == status)
            .map(|e| e.sequence)
            .max())
    }

    async fn update_status_and_tx_hash(
        &self,
        ids: &[i64],
        status: RelayStatus,
        tx_hash: &TxHash,
    ) -> StoreResult<()> {
        self.check_available()?;
        apply_update(&mut self.inner.write(), ids, Some(status), Some(tx_hash))
    }

    async fn update_tx_hash(&self, ids: &[i64], tx_hash: &TxHash) -> StoreResult<()> {
        self.check_available()?;
        apply_update(&mut self.inner.write(), ids, None, Some(tx_hash))
    }

    async fn votes_by_channel_and_sequence(
        &self,
        channel_id: ChannelId,
        sequence: u64,
    ) -> StoreResult<Vec<Vote>> {
        self.check_available()?;
        Ok(self
            .inner
            .read()
            .votes
            .get(&(channel_id, sequence))
            .cloned()
            .unwrap_or_default())
    }
}
