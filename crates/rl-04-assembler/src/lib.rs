//! # Assembler (Subsystem 4)
//!
//! Collects fully voted entries for one direction, aggregates their votes and
//! submits claims to the destination chain strictly in sequence order.
//!
//! ## Structure
//!
//! ```text
//! domain/
//! ├── leader.rs        # in-turn check, grace period, clock skew
//! ├── state.rs         # cached cursors and account nonce
//! ├── alert.rs         # delayed-delivery alert set
//! ├── claim_source.rs  # source chain selector carried by claims
//! └── submission.rs    # claim plans (plain claim, minted ack + claim)
//! ports/
//! ├── inbound.rs       # AssemblerApi
//! └── outbound.rs      # RelayStore, DestinationChain, SourceChain
//! adapters/            # in-memory store and shared destination ledger
//! coordinator.rs       # SequenceCoordinator
//! service.rs           # Assembler tick and run loop
//! ```
//!
//! ## Roles
//!
//! The in-turn relayer is the leader: it caches the delivery cursor and its
//! account nonce and claims as soon as entries are fully voted. Every other
//! relayer follows, re-reading chain state each tick and only claiming
//! entries the leader left alone for longer than `inturn_relayer_timeout`.

#![warn(missing_docs)]

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{
    AcceptedSubmission, DestinationClient, InMemoryDestinationLedger, InMemoryRelayStore,
    MockSourceChain,
};
pub use config::{AssemblerConfig, Direction};
pub use coordinator::SequenceCoordinator;
pub use domain::*;
pub use error::{AssemblerError, AssemblerResult, StoreError, StoreResult};
pub use ports::inbound::AssemblerApi;
pub use ports::outbound::{DestinationChain, RelayStore, SourceChain};
pub use service::{Assembler, BatchOutcome, ChannelReport, StopReason, TickReport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
