//! Ports for the light client bridge.

pub mod inbound;
pub mod outbound;
