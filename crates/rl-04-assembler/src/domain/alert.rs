//! # Delay Alerts
//!
//! Tracks entries that stayed undelivered past the alert threshold. A
//! channel's alerts clear together once its start sequence passes the highest
//! alerted sequence, since everything alerted has then been delivered.

use std::collections::BTreeSet;

use shared_types::ChannelId;

/// Per-direction set of delayed `(channel, sequence)` pairs.
#[derive(Debug, Clone, Default)]
pub struct DelayAlertSet {
    alerts: BTreeSet<(ChannelId, u64)>,
}

impl DelayAlertSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a delayed entry. Returns `true` the first time it is seen.
    pub fn raise(&mut self, channel_id: ChannelId, sequence: u64) -> bool {
        self.alerts.insert((channel_id, sequence))
    }

    /// Clears the channel's alerts when `start_sequence` is past all of them.
    ///
    /// Returns how many alerts were cleared.
    pub fn settle(&mut self, channel_id: ChannelId, start_sequence: u64) -> usize {
        let Some(max_alerted) = self.max_alerted(channel_id) else {
            return 0;
        };
        if start_sequence <= max_alerted {
            return 0;
        }
        let before = self.alerts.len();
        self.alerts.retain(|(channel, _)| *channel != channel_id);
        before - self.alerts.len()
    }

    /// Highest alerted sequence on a channel.
    pub fn max_alerted(&self, channel_id: ChannelId) -> Option<u64> {
        self.alerts
            .range((channel_id, 0)..=(channel_id, u64::MAX))
            .next_back()
            .map(|(_, sequence)| *sequence)
    }

    /// Delayed sequences on a channel, ascending.
    pub fn delayed(&self, channel_id: ChannelId) -> Vec<u64> {
        self.alerts
            .range((channel_id, 0)..=(channel_id, u64::MAX))
            .map(|(_, sequence)| *sequence)
            .collect()
    }

    /// Whether any delivery is currently delayed.
    pub fn has_delayed(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Number of delayed entries across channels.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
