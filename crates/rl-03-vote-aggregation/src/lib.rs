//! # Vote Aggregation (Subsystem 3)
//!
//! Turns per-relayer BLS votes over one (channel, sequence) into the artifact
//! a destination chain accepts: one aggregated signature plus a bitset of the
//! roster positions that contributed.
//!
//! ## Structure
//!
//! ```text
//! domain/
//! ├── bls.rs       # BLS12-381 (min-pk) sign / verify / aggregate
//! ├── bitset.rs    # positional participant bitset and its wire forms
//! └── event.rs     # digest every relayer signs
//! service.rs       # VoteAggregator
//! signer.rs        # VoteSigner (local relayer key)
//! ```
//!
//! The aggregator does not enforce quorum: the destination chain re-derives
//! voting power from the bitset and its own roster.

#![warn(missing_docs)]

pub mod domain;
pub mod error;
pub mod service;
pub mod signer;

pub use domain::bitset::{ParticipantBitset, VALIDATORS_CAPACITY};
pub use domain::bls::{verify_aggregate, verify_signature, BLS_DST};
pub use domain::event::compute_event_hash;
pub use error::{AggregationError, AggregationResult};
pub use service::{verify_vote, AggregatedVotes, VoteAggregator};
pub use signer::VoteSigner;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
