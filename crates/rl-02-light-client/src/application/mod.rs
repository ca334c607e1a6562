//! Application layer for the light client bridge.

pub mod service;

pub use service::LightClientSyncer;
