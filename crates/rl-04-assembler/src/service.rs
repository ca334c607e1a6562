//! # Assembler Service
//!
//! One `Assembler` per direction. Every tick:
//!
//! ```text
//! in-turn relayer ──▶ role ──▶ nonce ──▶ join_all(channel batches)
//!                                           │
//!         start (coordinator) .. end (store or source chain)
//!                                           │
//!   for each sequence: entries ▶ gates ▶ votes ▶ aggregate ▶ plan ▶ submit ▶ record
//! ```
//!
//! A batch stops at the first sequence that is not ready or fails; nothing
//! is ever skipped except entries already delivered.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rl_01_validator_cache::RosterProvider;
use rl_02_light_client::LightClientApi;
use rl_03_vote_aggregation::VoteAggregator;
use shared_types::{
    with_retry, ChainError, ChannelId, InturnRelayer, RelayEntry, RelayStatus, TimeSource, TxHash,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::AssemblerConfig;
use crate::coordinator::SequenceCoordinator;
use crate::domain::{evaluate_role, ClaimRequest, ClaimSourceChain, Role, SubmissionAction, SubmissionPlanner};
use crate::error::{AssemblerError, AssemblerResult};
use crate::ports::inbound::AssemblerApi;
use crate::ports::outbound::{DestinationChain, RelayStore, SourceChain};

/// Why a channel batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A new leader is waiting for destination counters to settle.
    GracePeriod,
    /// The leader holds no fully voted entry.
    NoPendingWork,
    /// Every sequence in the window was handled.
    WindowExhausted,
    /// Nothing was observed at this sequence yet.
    MissingEntry(u64),
    /// The entry at this sequence is not fully voted yet.
    AwaitingVotes(u64),
    /// A follower leaves this young entry to the leader.
    AwaitingLeader(u64),
}

/// Result of one channel batch that ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// First sequence of the window, when one was determined.
    pub start: Option<u64>,
    /// Sequences submitted this tick, ascending.
    pub delivered: Vec<u64>,
    /// Already delivered sequences passed over.
    pub skipped: Vec<u64>,
    /// Why the batch ended.
    pub stop: StopReason,
}

impl BatchOutcome {
    fn new(start: Option<u64>) -> Self {
        Self {
            start,
            delivered: Vec::new(),
            skipped: Vec::new(),
            stop: StopReason::WindowExhausted,
        }
    }

    fn stop_at(mut self, stop: StopReason) -> Self {
        self.stop = stop;
        self
    }
}

/// One channel's share of a tick.
#[derive(Debug)]
pub struct ChannelReport {
    /// Channel processed.
    pub channel_id: ChannelId,
    /// How its batch ended.
    pub outcome: AssemblerResult<BatchOutcome>,
}

/// Everything one tick did.
#[derive(Debug)]
pub struct TickReport {
    /// Role the tick ran in.
    pub role: Role,
    /// Per-channel results, in configuration order.
    pub channels: Vec<ChannelReport>,
}

impl TickReport {
    /// Result for one channel.
    pub fn outcome(&self, channel_id: ChannelId) -> Option<&AssemblerResult<BatchOutcome>> {
        self.channels
            .iter()
            .find(|report| report.channel_id == channel_id)
            .map(|report| &report.outcome)
    }

    /// Sequences submitted on a channel.
    pub fn delivered(&self, channel_id: ChannelId) -> Vec<u64> {
        match self.outcome(channel_id) {
            Some(Ok(outcome)) => outcome.delivered.clone(),
            _ => Vec::new(),
        }
    }
}

/// Assembler for one direction.
pub struct Assembler<St, D, S, R>
where
    St: RelayStore,
    D: DestinationChain,
    S: SourceChain,
    R: RosterProvider + 'static,
{
    config: AssemblerConfig,
    store: Arc<St>,
    destination: Arc<D>,
    source: Arc<S>,
    roster: Arc<R>,
    planner: Arc<dyn SubmissionPlanner>,
    clock: Arc<dyn TimeSource>,
    light_client: Option<Arc<dyn LightClientApi>>,
    aggregator: VoteAggregator,
    coordinator: SequenceCoordinator<D>,
}

impl<St, D, S, R> Assembler<St, D, S, R>
where
    St: RelayStore,
    D: DestinationChain,
    S: SourceChain,
    R: RosterProvider + 'static,
{
    /// Create an assembler; it starts as follower with nothing cached.
    pub fn new(
        config: AssemblerConfig,
        store: Arc<St>,
        destination: Arc<D>,
        source: Arc<S>,
        roster: Arc<R>,
        planner: Arc<dyn SubmissionPlanner>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let coordinator = SequenceCoordinator::new(destination.clone(), config.clone());
        Self {
            config,
            store,
            destination,
            source,
            roster,
            planner,
            clock,
            light_client: None,
            aggregator: VoteAggregator::new(),
            coordinator,
        }
    }

    /// Brings the destination light client up to each entry's height before claiming.
    pub fn with_light_client(mut self, light_client: Arc<dyn LightClientApi>) -> Self {
        self.light_client = Some(light_client);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Sequencing state of this direction.
    pub fn coordinator(&self) -> &SequenceCoordinator<D> {
        &self.coordinator
    }

    /// Runs one tick. Channel failures are reported, not returned.
    pub async fn run_tick(&self) -> AssemblerResult<TickReport> {
        let source = ClaimSourceChain::from_chain_id(self.config.chain_a_id);
        let destination = self.destination.clone();
        let inturn = with_retry(&self.config.retry, "inturn_relayer", || {
            let destination = destination.clone();
            async move { destination.inturn_relayer(source).await }
        })
        .await?;

        let role = evaluate_role(&self.config.local_bls_public_key, &inturn, self.clock.now());
        self.coordinator.observe_role(role);

        let inturn = &inturn;
        let channels = join_all(self.config.channels.iter().map(|&channel_id| async move {
            let outcome = self.process_channel(channel_id, inturn, role, source).await;
            self.log_outcome(channel_id, &outcome);
            ChannelReport { channel_id, outcome }
        }))
        .await;

        Ok(TickReport { role, channels })
    }

    /// Ticks on `tick_interval` until `shutdown` flips to `true`.
    ///
    /// A tick runs to completion before the next one is scheduled. Errors end
    /// the tick, never the loop.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(
            direction = %self.config.direction,
            channels = ?self.config.channels,
            interval_ms = self.config.tick_interval.as_millis() as u64,
            "[rl-04] Assembler loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_tick().await {
                        error!(direction = %self.config.direction, error = %e, "[rl-04] Tick failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(direction = %self.config.direction, "[rl-04] Assembler loop stopped");
                        break;
                    }
                }
            }
        }
    }

    async fn process_channel(
        &self,
        channel_id: ChannelId,
        inturn: &InturnRelayer,
        role: Role,
        source: ClaimSourceChain,
    ) -> AssemblerResult<BatchOutcome> {
        let Some(start) = self
            .coordinator
            .start_sequence(channel_id, inturn, self.clock.now())
            .await?
        else {
            return Ok(BatchOutcome::new(None).stop_at(StopReason::GracePeriod));
        };

        let end = match self.window_end(channel_id, role).await? {
            Some(end) => end,
            None => {
                self.coordinator.settle_alerts(channel_id, start);
                return Ok(BatchOutcome::new(Some(start)).stop_at(StopReason::NoPendingWork));
            }
        };
        debug!(
            direction = %self.config.direction,
            channel_id = %channel_id,
            start,
            end,
            leader = role.is_leader(),
            "[rl-04] Processing window"
        );

        let cleared = self.coordinator.settle_alerts(channel_id, start);
        if cleared > 0 {
            info!(
                direction = %self.config.direction,
                channel_id = %channel_id,
                cleared,
                "[rl-04] Delayed deliveries caught up"
            );
        }

        let mut outcome = BatchOutcome::new(Some(start));
        for sequence in start..end {
            let entries = self
                .store
                .entries_by_channel_and_sequence(channel_id, sequence)
                .await?;
            let Some(first) = entries.first() else {
                debug!(channel_id = %channel_id, sequence, "[rl-04] Entry not observed yet");
                return Ok(outcome.stop_at(StopReason::MissingEntry(sequence)));
            };

            let now = self.clock.now();
            let age_secs = now - first.tx_time;
            if age_secs > self.config.alert_threshold_secs()
                && self.coordinator.raise_alert(channel_id, sequence)
            {
                warn!(
                    direction = %self.config.direction,
                    channel_id = %channel_id,
                    sequence,
                    age_secs,
                    "[rl-04] Delivery delayed past alert threshold"
                );
            }

            if entries.iter().any(|e| !e.status.is_assemblable()) {
                debug!(channel_id = %channel_id, sequence, "[rl-04] Entry not fully voted yet");
                return Ok(outcome.stop_at(StopReason::AwaitingVotes(sequence)));
            }
            if entries.iter().all(|e| e.status == RelayStatus::Delivered) {
                if role.is_leader() {
                    self.coordinator.record_delivery(channel_id, sequence);
                }
                outcome.skipped.push(sequence);
                continue;
            }
            if !role.is_leader() && now < first.tx_time + self.config.inturn_timeout_secs() {
                debug!(channel_id = %channel_id, sequence, "[rl-04] Leaving entry to the in-turn relayer");
                return Ok(outcome.stop_at(StopReason::AwaitingLeader(sequence)));
            }

            if let Err(e) = self.deliver(channel_id, sequence, &entries, role, source).await {
                if role.is_leader() {
                    if let Err(recovery) = self.coordinator.recover(channel_id).await {
                        error!(
                            direction = %self.config.direction,
                            channel_id = %channel_id,
                            error = %recovery,
                            "[rl-04] Recalibration failed, cache dropped"
                        );
                    }
                }
                return Err(e);
            }
            outcome.delivered.push(sequence);
        }

        Ok(outcome.stop_at(StopReason::WindowExhausted))
    }

    /// Exclusive end of the window, or `None` when the leader has nothing voted.
    async fn window_end(&self, channel_id: ChannelId, role: Role) -> AssemblerResult<Option<u64>> {
        if role.is_leader() {
            let latest = self
                .store
                .latest_sequence_by_status(channel_id, RelayStatus::AllVoted)
                .await?;
            return Ok(latest.map(|sequence| sequence + 1));
        }

        let source = self.source.clone();
        let next_send = with_retry(&self.config.retry, "next_send_sequence", || {
            let source = source.clone();
            async move { source.next_send_sequence(channel_id).await }
        })
        .await?;
        Ok(Some(next_send))
    }

    async fn deliver(
        &self,
        channel_id: ChannelId,
        sequence: u64,
        entries: &[RelayEntry],
        role: Role,
        source: ClaimSourceChain,
    ) -> AssemblerResult<TxHash> {
        let votes = self
            .store
            .votes_by_channel_and_sequence(channel_id, sequence)
            .await?;
        let roster = self.roster.roster().await?;
        let aggregated = self.aggregator.aggregate(&votes, roster.as_slice())?;

        let tx_time = entries.iter().map(|e| e.tx_time).min().unwrap_or_default();
        if let Some(light_client) = &self.light_client {
            let height = entries.iter().map(|e| e.height).max().unwrap_or_default();
            if let Some(sync_tx) = light_client.ensure_synced(height).await? {
                info!(
                    channel_id = %channel_id,
                    sequence,
                    height,
                    tx_hash = %sync_tx,
                    "[rl-04] Synced light client before claim"
                );
            }
        }

        let plan = self.planner.plan(ClaimRequest {
            channel_id,
            sequence,
            payload: aggregated.claim_payload,
            signature: aggregated.signature,
            bitset: aggregated.bitset,
            tx_time,
            source,
        })?;

        let base_nonce = self.coordinator.reserve_nonces(plan.nonce_count());
        let mut tx_hash = TxHash::default();
        for step in plan.steps() {
            let nonce = base_nonce + step.nonce_offset;
            tx_hash = self
                .submit_once(&step.action, nonce)
                .await
                .map_err(|e| AssemblerError::from_submission(channel_id, sequence, e))?;
            info!(
                direction = %self.config.direction,
                channel_id = %channel_id,
                sequence,
                nonce,
                kind = step.action.kind(),
                tx_hash = %tx_hash,
                "[rl-04] Submitted transaction"
            );
        }

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        if role.is_leader() {
            self.store
                .update_status_and_tx_hash(&ids, RelayStatus::Delivered, &tx_hash)
                .await?;
            self.coordinator.record_delivery(channel_id, sequence);
        } else {
            self.store.update_tx_hash(&ids, &tx_hash).await?;
        }
        Ok(tx_hash)
    }

    /// Submissions are not retried: a retry could land the same claim twice.
    async fn submit_once(&self, action: &SubmissionAction, nonce: u64) -> Result<TxHash, ChainError> {
        let timeout = self.config.retry.call_timeout;
        match tokio::time::timeout(timeout, self.destination.submit(action, nonce)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout {
                millis: timeout.as_millis() as u64,
            }),
        }
    }

    fn log_outcome(&self, channel_id: ChannelId, outcome: &AssemblerResult<BatchOutcome>) {
        match outcome {
            Ok(batch) if !batch.delivered.is_empty() => info!(
                direction = %self.config.direction,
                channel_id = %channel_id,
                delivered = batch.delivered.len(),
                stop = ?batch.stop,
                "[rl-04] Batch delivered"
            ),
            Ok(batch) => debug!(
                direction = %self.config.direction,
                channel_id = %channel_id,
                stop = ?batch.stop,
                "[rl-04] Batch idle"
            ),
            Err(e) => error!(
                direction = %self.config.direction,
                channel_id = %channel_id,
                error = %e,
                "[rl-04] Batch aborted"
            ),
        }
    }
}

#[async_trait]
impl<St, D, S, R> AssemblerApi for Assembler<St, D, S, R>
where
    St: RelayStore,
    D: DestinationChain,
    S: SourceChain,
    R: RosterProvider + 'static,
{
    async fn tick(&self) -> AssemblerResult<TickReport> {
        self.run_tick().await
    }

    fn role(&self) -> Role {
        self.coordinator.role()
    }

    fn has_delayed_deliveries(&self) -> bool {
        self.coordinator.has_delayed_deliveries()
    }
}
