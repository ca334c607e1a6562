//! Cross-crate scenarios.

pub mod fixtures;
pub mod leader_failover;
pub mod relay_flows;
