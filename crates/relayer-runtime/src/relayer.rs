//! # Relayer
//!
//! Owns the long-running tasks of one relayer and their shutdown signal.
//!
//! ```text
//!                  ┌──────────── watch<bool> ────────────┐
//!                  ▼              ▼              ▼        ▼
//!          assembler a-to-b  assembler b-to-a  roster A  roster B
//! ```
//!
//! Every task ticks on its own interval and survives its own errors; only
//! the shutdown signal ends it.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rl_01_validator_cache::{RosterProvider, RosterSource, ValidatorSetCache};
use rl_04_assembler::{Assembler, DestinationChain, RelayStore, SourceChain};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::RelayerConfig;

/// A loop the relayer spawns and stops.
#[async_trait]
pub trait BackgroundTask: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Runs until `shutdown` flips to `true`.
    async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>);
}

#[async_trait]
impl<St, D, S, R> BackgroundTask for Assembler<St, D, S, R>
where
    St: RelayStore,
    D: DestinationChain,
    S: SourceChain,
    R: RosterProvider + 'static,
{
    fn name(&self) -> String {
        format!("assembler-{}", self.config().direction)
    }

    async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        Assembler::run(self, shutdown).await
    }
}

#[async_trait]
impl<S> BackgroundTask for ValidatorSetCache<S>
where
    S: RosterSource + 'static,
{
    fn name(&self) -> String {
        format!("roster-{}", self.label())
    }

    async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        self.run_refresh_loop(shutdown).await
    }
}

/// The four loops of a relayer.
pub struct RelayerTasks {
    /// Assembler claiming Chain A packages on Chain B.
    pub a_to_b: Arc<dyn BackgroundTask>,
    /// Assembler claiming Chain B transactions on Chain A.
    pub b_to_a: Arc<dyn BackgroundTask>,
    /// Chain A relayer roster refresh.
    pub relayer_roster: Arc<dyn BackgroundTask>,
    /// Chain B validator roster refresh.
    pub validator_roster: Arc<dyn BackgroundTask>,
}

impl RelayerTasks {
    fn all(&self) -> [Arc<dyn BackgroundTask>; 4] {
        [
            self.relayer_roster.clone(),
            self.validator_roster.clone(),
            self.a_to_b.clone(),
            self.b_to_a.clone(),
        ]
    }
}

/// One relayer process.
pub struct Relayer {
    config: RelayerConfig,
    tasks: RelayerTasks,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl Relayer {
    /// Create a relayer; nothing runs until [`Relayer::start`].
    pub fn new(config: RelayerConfig, tasks: RelayerTasks) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            tasks,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Configuration the relayer was built from.
    pub fn config(&self) -> &RelayerConfig {
        &self.config
    }

    /// Spawns every loop on the current tokio runtime.
    ///
    /// Rosters start first so the assemblers' first tick finds them warm.
    pub fn start(&self) -> Result<()> {
        let mut handles = self.handles.lock();
        if !handles.is_empty() {
            bail!("relayer already started");
        }
        if *self.shutdown_tx.borrow() {
            bail!("relayer was shut down");
        }

        for task in self.tasks.all() {
            let name = task.name();
            let shutdown = self.shutdown_tx.subscribe();
            info!(task = %name, "Starting background task");
            handles.push((name, tokio::spawn(task.run(shutdown))));
        }

        info!(
            service = %self.config.telemetry.service_name,
            a_to_b_channels = ?self.config.a_to_b.channels,
            b_to_a_channels = ?self.config.b_to_a.channels,
            "Relayer running"
        );
        Ok(())
    }

    /// Whether the loops are spawned and not yet told to stop.
    pub fn is_running(&self) -> bool {
        !self.handles.lock().is_empty() && !*self.shutdown_tx.borrow()
    }

    /// Signals every loop to stop and waits for them to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let handles = std::mem::take(&mut *self.handles.lock());
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                error!(task = %name, error = %e, "Background task ended abnormally");
            }
        }
        info!("Shutdown complete");
    }
}
