//! # Relayer Test Suite
//!
//! Unified cross-crate test crate: multi-relayer scenarios and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── relayer_benchmarks.rs   # aggregation, bitset and light-block cost
//! └── src/integration/
//!     ├── fixtures.rs             # shared multi-relayer network
//!     ├── leader_failover.rs      # leader / follower races on one ledger
//!     └── relay_flows.rs          # votes to verifiable claims, runtime wiring
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p rl-tests
//!
//! # By scenario group
//! cargo test -p rl-tests integration::leader_failover::
//!
//! # Benchmarks
//! cargo bench -p rl-tests
//! ```

pub mod integration;
