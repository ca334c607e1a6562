//! Ports for the validator cache.

pub mod inbound;
pub mod outbound;
