//! # Validator Set Cache Service
//!
//! Read-mostly cache: one background timer writes, many callers read.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::with_retry;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ValidatorCacheConfig;
use crate::error::{RosterError, RosterResult};
use crate::ports::inbound::RosterProvider;
use crate::ports::outbound::RosterSource;

/// Cached roster of one chain.
pub struct ValidatorSetCache<S: RosterSource> {
    source: Arc<S>,
    cached: RwLock<Option<Arc<Vec<S::Member>>>>,
    config: ValidatorCacheConfig,
    label: &'static str,
}

impl<S: RosterSource> ValidatorSetCache<S> {
    /// Create an empty cache; the first read or refresh populates it.
    pub fn new(source: Arc<S>, config: ValidatorCacheConfig, label: &'static str) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
            config,
            label,
        }
    }

    /// Queries the chain and replaces the cached roster.
    ///
    /// An empty answer leaves the previous roster in place.
    pub async fn refresh(&self) -> RosterResult<Arc<Vec<S::Member>>> {
        let source = self.source.clone();
        let roster = with_retry(&self.config.retry, "query_latest_roster", || {
            let source = source.clone();
            async move { source.query_latest_roster().await }
        })
        .await?;

        if roster.is_empty() {
            return Err(RosterError::EmptyRoster);
        }

        let roster = Arc::new(roster);
        *self.cached.write() = Some(roster.clone());
        debug!(roster = self.label, size = roster.len(), "[rl-01] Roster refreshed");
        Ok(roster)
    }

    /// Cached roster, falling back to a live query when nothing is cached yet.
    pub async fn cached_roster(&self) -> RosterResult<Arc<Vec<S::Member>>> {
        let cached = self.cached.read().clone();
        if let Some(roster) = cached {
            return Ok(roster);
        }
        self.refresh().await
    }

    /// Name of the roster in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether a roster has been loaded.
    pub fn is_warm(&self) -> bool {
        self.cached.read().is_some()
    }

    /// Refreshes on a fixed interval until `shutdown` flips to `true`.
    ///
    /// Failures are logged; the previous roster keeps serving reads.
    pub async fn run_refresh_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(
            roster = self.label,
            interval_secs = self.config.refresh_interval.as_secs(),
            "[rl-01] Roster refresh loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(roster = self.label, error = %e, "[rl-01] Roster refresh failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(roster = self.label, "[rl-01] Roster refresh loop stopped");
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<S: RosterSource> RosterProvider for ValidatorSetCache<S> {
    type Member = S::Member;

    async fn roster(&self) -> RosterResult<Arc<Vec<S::Member>>> {
        self.cached_roster().await
    }
}
