//! # Relayer Runtime
//!
//! Composition root of one relayer: configuration, tracing and the
//! background loops of every subsystem.
//!
//! ## Startup Sequence
//!
//! 1. `RelayerConfig::from_env()`
//! 2. `init_tracing(&config.telemetry)`
//! 3. Build the adapters and subsystems, hand their loops to `Relayer::new`
//! 4. `Relayer::start()`
//! 5. `Relayer::shutdown().await` on the operator's stop signal
//!
//! ```rust,ignore
//! let config = RelayerConfig::from_env()?;
//! init_tracing(&config.telemetry)?;
//! let relayer = Relayer::new(config, tasks);
//! relayer.start()?;
//! tokio::signal::ctrl_c().await?;
//! relayer.shutdown().await;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod relayer;
pub mod telemetry;

pub use config::RelayerConfig;
pub use relayer::{BackgroundTask, Relayer, RelayerTasks};
pub use telemetry::{init_tracing, TelemetryConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
