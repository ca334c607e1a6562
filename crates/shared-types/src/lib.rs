//! # Shared Types Crate
//!
//! Entities, chain error taxonomy, retry policy and time sources shared by
//! every relayer subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: entries, votes and roster shapes are defined
//!   once and used by the cache, light client, aggregator and assembler.
//! - **Capability over shape**: rosters from either chain are consumed through
//!   the `RosterMember` trait, never by concrete type.

pub mod entities;
pub mod errors;
pub mod retry;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use retry::{with_retry, RetryConfig};
pub use time::{ControllableTimeSource, SystemTimeSource, TimeSource};
