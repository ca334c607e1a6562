//! Adapters for the light client bridge.

pub mod in_memory;

pub use in_memory::{InMemoryLightClientContract, MockLightBlockSource};
