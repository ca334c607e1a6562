//! # Coordinator State
//!
//! Everything one direction mutates between ticks: the role, the account
//! nonce, each channel's delivery cursor and the delay alerts. It is owned by
//! a single lock; the per-channel sub-tasks of a tick share it.
//!
//! The leader caches its cursors (`has_retrieved`) and advances them itself.
//! A follower never trusts a cached value.

use std::collections::HashMap;

use shared_types::ChannelId;

use crate::domain::alert::DelayAlertSet;

/// Cached delivery cursor of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceStatus {
    /// Next sequence the destination expects.
    pub next_delivery_sequence: u64,
    /// Whether the cursor was read from chain during the current leadership.
    pub has_retrieved: bool,
}

/// Cached account nonce of the local relayer on the destination chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceStatus {
    /// Next unused nonce.
    pub nonce: u64,
    /// Whether the nonce was read from chain during the current leadership.
    pub has_retrieved: bool,
}

/// Mutable state of one direction.
#[derive(Debug, Default)]
pub struct CoordinatorState {
    leader: bool,
    nonce: NonceStatus,
    /// Set once a nonce was read during the current tick.
    nonce_read_this_tick: bool,
    channels: HashMap<ChannelId, SequenceStatus>,
    alerts: DelayAlertSet,
}

impl CoordinatorState {
    /// Fresh follower state with nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last tick ran as leader.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Records the role for a new tick. Returns `true` when it changed.
    ///
    /// Any tick as follower drops every cached value, so the next leadership
    /// starts from chain state.
    pub fn set_leader(&mut self, leader: bool) -> bool {
        let changed = self.leader != leader;
        self.leader = leader;
        self.nonce_read_this_tick = false;
        if !leader {
            self.invalidate_all();
        }
        changed
    }

    /// Cached cursor for `channel_id`, if one was retrieved.
    pub fn cached_start(&self, channel_id: ChannelId) -> Option<u64> {
        self.channels
            .get(&channel_id)
            .filter(|status| status.has_retrieved)
            .map(|status| status.next_delivery_sequence)
    }

    /// Stores a cursor read from chain. Only a leader keeps it cached.
    pub fn store_start(&mut self, channel_id: ChannelId, next_delivery_sequence: u64) {
        let leader = self.leader;
        let status = self.channels.entry(channel_id).or_default();
        status.next_delivery_sequence = next_delivery_sequence;
        status.has_retrieved = leader;
    }

    /// Channel cursor, cached or not.
    pub fn sequence_status(&self, channel_id: ChannelId) -> SequenceStatus {
        self.channels.get(&channel_id).copied().unwrap_or_default()
    }

    /// Whether the nonce must be read from chain before submitting.
    ///
    /// A follower reads once per tick; every channel of that tick reserves
    /// from the same read.
    pub fn needs_nonce(&self) -> bool {
        !self.nonce_read_this_tick && (!self.leader || !self.nonce.has_retrieved)
    }

    /// Stores a nonce read from chain. Only a leader keeps it cached.
    pub fn store_nonce(&mut self, nonce: u64) {
        self.nonce = NonceStatus {
            nonce,
            has_retrieved: self.leader,
        };
        self.nonce_read_this_tick = true;
    }

    /// Current nonce status.
    pub fn nonce_status(&self) -> NonceStatus {
        self.nonce
    }

    /// Reserves `count` consecutive nonces and returns the first.
    pub fn reserve_nonces(&mut self, count: u64) -> u64 {
        let base = self.nonce.nonce;
        self.nonce.nonce = base + count;
        base
    }

    /// Moves the cursor past a delivered sequence. Never moves it back.
    pub fn record_delivery(&mut self, channel_id: ChannelId, sequence: u64) {
        let status = self.channels.entry(channel_id).or_default();
        status.next_delivery_sequence = status.next_delivery_sequence.max(sequence + 1);
    }

    /// Overwrites both cursors with freshly read chain values.
    pub fn recalibrate(&mut self, channel_id: ChannelId, nonce: u64, next_delivery_sequence: u64) {
        self.store_nonce(nonce);
        self.store_start(channel_id, next_delivery_sequence);
    }

    /// Forgets the cached cursor of one channel and the nonce.
    pub fn invalidate(&mut self, channel_id: ChannelId) {
        if let Some(status) = self.channels.get_mut(&channel_id) {
            status.has_retrieved = false;
        }
        self.nonce.has_retrieved = false;
        self.nonce_read_this_tick = false;
    }

    fn invalidate_all(&mut self) {
        for status in self.channels.values_mut() {
            status.has_retrieved = false;
        }
        self.nonce.has_retrieved = false;
    }

    /// Delay alerts of this direction.
    pub fn alerts(&self) -> &DelayAlertSet {
        &self.alerts
    }

    /// Mutable delay alerts of this direction.
    pub fn alerts_mut(&mut self) -> &mut DelayAlertSet {
        &mut self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_caches_and_follower_does_not() {
        let mut state = CoordinatorState::new();
        assert!(state.set_leader(true));
        state.store_start(ChannelId::ORACLE, 10);
        assert_eq!(state.cached_start(ChannelId::ORACLE), Some(10));

        assert!(state.set_leader(false));
        assert_eq!(state.cached_start(ChannelId::ORACLE), None);

        state.store_start(ChannelId::ORACLE, 11);
        assert_eq!(state.cached_start(ChannelId::ORACLE), None);
        assert_eq!(state.sequence_status(ChannelId::ORACLE).next_delivery_sequence, 11);
    }

    #[test]
    fn test_losing_leadership_drops_cached_nonce() {
        let mut state = CoordinatorState::new();
        state.set_leader(true);
        assert!(state.needs_nonce());
        state.store_nonce(40);
        assert!(!state.needs_nonce());

        state.set_leader(false);
        assert!(state.needs_nonce());
        state.set_leader(true);
        assert!(state.needs_nonce());
    }

    #[test]
    fn test_repeated_role_is_not_a_change() {
        let mut state = CoordinatorState::new();
        assert!(!state.set_leader(false));
        assert!(state.set_leader(true));
        assert!(!state.set_leader(true));
    }

    #[test]
    fn test_reservations_are_consecutive() {
        let mut state = CoordinatorState::new();
        state.store_nonce(7);
        assert_eq!(state.reserve_nonces(2), 7);
        assert_eq!(state.reserve_nonces(1), 9);
        assert_eq!(state.nonce_status().nonce, 10);
    }

    #[test]
    fn test_record_delivery_never_rewinds() {
        let mut state = CoordinatorState::new();
        state.set_leader(true);
        state.store_start(ChannelId::SBT, 5);
        state.record_delivery(ChannelId::SBT, 5);
        assert_eq!(state.cached_start(ChannelId::SBT), Some(6));
        state.record_delivery(ChannelId::SBT, 3);
        assert_eq!(state.cached_start(ChannelId::SBT), Some(6));
    }

    #[test]
    fn test_recalibrate_overwrites_cache() {
        let mut state = CoordinatorState::new();
        state.set_leader(true);
        state.store_nonce(20);
        state.store_start(ChannelId::ORACLE, 9);
        state.reserve_nonces(3);

        state.recalibrate(ChannelId::ORACLE, 21, 10);
        assert_eq!(state.nonce_status(), NonceStatus { nonce: 21, has_retrieved: true });
        assert_eq!(state.cached_start(ChannelId::ORACLE), Some(10));
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let mut state = CoordinatorState::new();
        state.set_leader(true);
        state.store_nonce(1);
        state.store_start(ChannelId::ORACLE, 2);
        state.invalidate(ChannelId::ORACLE);
        assert!(state.needs_nonce());
        assert_eq!(state.cached_start(ChannelId::ORACLE), None);
    }

    #[test]
    fn test_follower_reads_nonce_once_per_tick() {
        let mut state = CoordinatorState::new();
        state.set_leader(false);
        assert!(state.needs_nonce());
        state.store_nonce(8);
        state.reserve_nonces(1);
        assert!(!state.needs_nonce());
        assert_eq!(state.nonce_status(), NonceStatus { nonce: 9, has_retrieved: false });

        state.set_leader(false);
        assert!(state.needs_nonce());
    }
}
