//! # Validator Set Cache (Subsystem 1)
//!
//! Holds the last known validator roster of one chain and serves cached reads
//! so the assembler does not pay a chain round trip per aggregation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               ValidatorSetCache<S>                │
//! │  ┌───────────────┐       ┌────────────────────┐  │
//! │  │ refresh loop  │──────▶│ RwLock<Arc<Vec<M>>> │  │
//! │  └───────┬───────┘ write └─────────┬──────────┘  │
//! │          │                         │ read         │
//! │          ▼                         ▼              │
//! │   RosterSource (port)      RosterProvider (port)  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The roster order is the chain's canonical order; positions in it are bit
//! indices for vote aggregation, so the cache never reorders members.

#![warn(missing_docs)]

pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::MockRosterSource;
pub use config::ValidatorCacheConfig;
pub use error::{RosterError, RosterResult};
pub use ports::inbound::RosterProvider;
pub use ports::outbound::RosterSource;
pub use service::ValidatorSetCache;

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
