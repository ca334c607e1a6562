//! # Assembler Configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use shared_types::{BlsPublicKey, ChannelId, RetryConfig};

/// Which way an assembler moves packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Packages observed on Chain A, claimed on Chain B.
    AToB,
    /// Transactions observed on Chain B, claimed on Chain A.
    BToA,
}

impl Direction {
    /// Short label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::AToB => "a-to-b",
            Direction::BToA => "b-to-a",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of one assembler loop.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Direction this loop delivers in.
    pub direction: Direction,

    /// Channels processed concurrently on every tick.
    pub channels: Vec<ChannelId>,

    /// Key the local relayer votes with; compared against the in-turn key.
    pub local_bls_public_key: BlsPublicKey,

    /// Chain A chain id, selecting the claim source on Chain B.
    pub chain_a_id: u64,

    /// Interval between ticks.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,

    /// Grace after a leader rotation before destination counters are trusted.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub sequence_update_latency: Duration,

    /// Age an entry must reach before a non-leader may claim it.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub inturn_relayer_timeout: Duration,

    /// Age past which an undelivered entry raises a delay alert.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tx_delay_alert_threshold: Duration,

    /// Pause before re-reading chain state after a failed leader submission.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub conflict_block_wait: Duration,

    /// Retry policy for chain queries. Submissions are attempted once.
    pub retry: RetryConfig,
}

impl AssemblerConfig {
    /// Production defaults for `direction`, keyed by the local relayer.
    pub fn new(direction: Direction, local_bls_public_key: BlsPublicKey) -> Self {
        let channels = match direction {
            Direction::AToB => vec![ChannelId::ORACLE],
            Direction::BToA => vec![ChannelId::SBT],
        };
        Self {
            direction,
            channels,
            local_bls_public_key,
            chain_a_id: 56,
            tick_interval: Duration::from_millis(500),
            sequence_update_latency: Duration::from_secs(8),
            inturn_relayer_timeout: Duration::from_secs(40),
            tx_delay_alert_threshold: Duration::from_secs(300),
            conflict_block_wait: Duration::from_secs(1),
            retry: RetryConfig::default(),
        }
    }

    /// Create a config for testing (no grace periods, fast retries).
    pub fn for_testing(direction: Direction, local_bls_public_key: BlsPublicKey) -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            sequence_update_latency: Duration::ZERO,
            inturn_relayer_timeout: Duration::from_secs(30),
            conflict_block_wait: Duration::from_millis(10),
            retry: RetryConfig::for_testing(),
            ..Self::new(direction, local_bls_public_key)
        }
    }

    pub(crate) fn latency_secs(&self) -> i64 {
        self.sequence_update_latency.as_secs() as i64
    }

    pub(crate) fn inturn_timeout_secs(&self) -> i64 {
        self.inturn_relayer_timeout.as_secs() as i64
    }

    pub(crate) fn alert_threshold_secs(&self) -> i64 {
        self.tx_delay_alert_threshold.as_secs() as i64
    }
}
