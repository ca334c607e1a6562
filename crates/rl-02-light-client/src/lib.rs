//! # Light Client Bridge (Subsystem 2)
//!
//! Keeps the Chain A light client of Chain B moving forward. The on-chain
//! contract stores a compact consensus state; this crate decodes it, verifies
//! a new signed header against it, and re-encodes the result in the exact
//! layout the contract consumes.
//!
//! ## Verification Paths
//!
//! ```text
//! new height == trusted + 1          new height > trusted + 1
//! ─────────────────────────          ────────────────────────────────────
//! valset hash == stored next hash    commit vs trusted set  @ 1/3 (default)
//! commit vs new set @ 2/3            commit vs new set      @ 2/3
//! ```
//!
//! Headers, validator sets and commits are `tendermint` types; signature
//! tallying runs through `tendermint-light-client-verifier`.
//!
//! ## Wire Layout
//!
//! ```text
//! consensus state:  chain_id[32] | height[8] | next_valset_hash[32] | validator[108]*
//! validator:        pubkey[32] | power[8] | relayer_addr[20] | relayer_bls[48]
//! sync payload:     changed[1] | zero[23] | len(state)[8] | state
//! ```
//!
//! All integers are big-endian.

#![warn(missing_docs)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapters::{InMemoryLightClientContract, MockLightBlockSource};
pub use algorithms::{
    apply_light_block, encode_validation_result, verify_commit_light,
    verify_commit_light_trusting,
};
pub use application::LightClientSyncer;
pub use config::LightClientConfig;
pub use domain::*;
pub use ports::inbound::LightClientApi;
pub use ports::outbound::{LightBlockSource, LightClientContract};

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
