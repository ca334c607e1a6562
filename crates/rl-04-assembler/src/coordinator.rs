//! # Sequence Coordinator
//!
//! Decides where each channel's batch starts and hands out nonces. All state
//! lives in one `CoordinatorState` behind a single lock; chain reads happen
//! with the lock released and their results are written back afterwards.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{with_retry, ChannelId, InturnRelayer};
use tracing::{debug, info, warn};

use crate::config::AssemblerConfig;
use crate::domain::{leader_grace, CoordinatorState, GraceCheck, NonceStatus, Role, SequenceStatus};
use crate::error::{AssemblerError, AssemblerResult};
use crate::ports::outbound::DestinationChain;

/// Per-direction sequencing state machine.
pub struct SequenceCoordinator<D: DestinationChain> {
    destination: Arc<D>,
    state: Mutex<CoordinatorState>,
    config: AssemblerConfig,
}

impl<D: DestinationChain> SequenceCoordinator<D> {
    /// Create a coordinator that starts as follower with nothing cached.
    pub fn new(destination: Arc<D>, config: AssemblerConfig) -> Self {
        Self {
            destination,
            state: Mutex::new(CoordinatorState::new()),
            config,
        }
    }

    /// Records the role of the current tick.
    pub fn observe_role(&self, role: Role) {
        let changed = self.state.lock().set_leader(role.is_leader());
        if !changed {
            return;
        }
        match role {
            Role::Leader => info!(
                direction = %self.config.direction,
                "[rl-04] Local relayer is now in turn"
            ),
            Role::Follower => info!(
                direction = %self.config.direction,
                "[rl-04] Local relayer is no longer in turn, cached cursors dropped"
            ),
        }
    }

    /// Role recorded for the current tick.
    pub fn role(&self) -> Role {
        if self.state.lock().is_leader() {
            Role::Leader
        } else {
            Role::Follower
        }
    }

    /// First sequence to process on `channel_id` this tick.
    ///
    /// `None` means a new leader is still inside its post-rotation grace
    /// period. A follower always sleeps the grace interval and then reads the
    /// chain afresh. The account nonce is read past the same point, so it
    /// reflects transactions that landed during the wait.
    pub async fn start_sequence(
        &self,
        channel_id: ChannelId,
        inturn: &InturnRelayer,
        now: i64,
    ) -> AssemblerResult<Option<u64>> {
        if self.state.lock().is_leader() {
            let cached = self.state.lock().cached_start(channel_id);
            if let Some(start) = cached {
                self.refresh_nonce().await?;
                return Ok(Some(start));
            }
            if let GraceCheck::Wait { remaining_secs } =
                leader_grace(now, inturn, self.config.latency_secs())?
            {
                debug!(
                    direction = %self.config.direction,
                    channel_id = %channel_id,
                    remaining_secs,
                    "[rl-04] Waiting for destination counters to settle"
                );
                return Ok(None);
            }
        } else {
            tokio::time::sleep(self.config.sequence_update_latency).await;
        }

        let next = self.fetch_next_delivery(channel_id).await?;
        self.state.lock().store_start(channel_id, next);
        self.refresh_nonce().await?;
        Ok(Some(next))
    }

    /// Reserves `count` consecutive nonces and returns the first.
    pub fn reserve_nonces(&self, count: u64) -> u64 {
        self.state.lock().reserve_nonces(count)
    }

    /// Moves the channel cursor past a confirmed sequence.
    pub fn record_delivery(&self, channel_id: ChannelId, sequence: u64) {
        self.state.lock().record_delivery(channel_id, sequence);
    }

    /// Re-reads nonce and cursor after a failed leader submission.
    ///
    /// The fresh values overwrite the cache. When the reads fail too, the
    /// cache is dropped so the next tick starts from chain state.
    pub async fn recover(&self, channel_id: ChannelId) -> AssemblerResult<()> {
        tokio::time::sleep(self.config.conflict_block_wait).await;

        let destination = self.destination.clone();
        let recalibrated = async {
            let nonce = with_retry(&self.config.retry, "account_nonce_on_next_block", || {
                let destination = destination.clone();
                async move { destination.account_nonce_on_next_block().await }
            })
            .await?;
            let next = self.fetch_next_delivery(channel_id).await?;
            Ok::<_, AssemblerError>((nonce, next))
        }
        .await;

        match recalibrated {
            Ok((nonce, next)) => {
                self.state.lock().recalibrate(channel_id, nonce, next);
                warn!(
                    direction = %self.config.direction,
                    channel_id = %channel_id,
                    nonce,
                    next_delivery_sequence = next,
                    "[rl-04] Recalibrated nonce and sequence from chain"
                );
                Ok(())
            }
            Err(e) => {
                self.state.lock().invalidate(channel_id);
                Err(e)
            }
        }
    }

    /// Records a delayed entry. Returns `true` the first time it is seen.
    pub fn raise_alert(&self, channel_id: ChannelId, sequence: u64) -> bool {
        self.state.lock().alerts_mut().raise(channel_id, sequence)
    }

    /// Clears the channel's alerts once `start_sequence` passed them all.
    pub fn settle_alerts(&self, channel_id: ChannelId, start_sequence: u64) -> usize {
        self.state.lock().alerts_mut().settle(channel_id, start_sequence)
    }

    /// Whether any delivery of this direction is delayed.
    pub fn has_delayed_deliveries(&self) -> bool {
        self.state.lock().alerts().has_delayed()
    }

    /// Delayed sequences on a channel.
    pub fn delayed(&self, channel_id: ChannelId) -> Vec<u64> {
        self.state.lock().alerts().delayed(channel_id)
    }

    /// Current nonce status.
    pub fn nonce_status(&self) -> NonceStatus {
        self.state.lock().nonce_status()
    }

    /// Current cursor of a channel.
    pub fn sequence_status(&self, channel_id: ChannelId) -> SequenceStatus {
        self.state.lock().sequence_status(channel_id)
    }

    /// Reads the account nonce unless it is already held.
    ///
    /// Concurrent channels may race to read; only the first result is kept.
    async fn refresh_nonce(&self) -> AssemblerResult<()> {
        if !self.state.lock().needs_nonce() {
            return Ok(());
        }
        let destination = self.destination.clone();
        let nonce = with_retry(&self.config.retry, "account_nonce", || {
            let destination = destination.clone();
            async move { destination.account_nonce().await }
        })
        .await?;
        let mut state = self.state.lock();
        if state.needs_nonce() {
            state.store_nonce(nonce);
            debug!(direction = %self.config.direction, nonce, "[rl-04] Account nonce loaded");
        }
        Ok(())
    }

    async fn fetch_next_delivery(&self, channel_id: ChannelId) -> AssemblerResult<u64> {
        let destination = self.destination.clone();
        let next = with_retry(&self.config.retry, "next_delivery_sequence", || {
            let destination = destination.clone();
            async move { destination.next_delivery_sequence(channel_id).await }
        })
        .await?;
        Ok(next)
    }
}
