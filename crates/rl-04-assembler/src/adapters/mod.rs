//! Adapters for the assembler ports.

pub mod in_memory_chain;
pub mod in_memory_store;

pub use in_memory_chain::{AcceptedSubmission, DestinationClient, InMemoryDestinationLedger, MockSourceChain};
pub use in_memory_store::InMemoryRelayStore;
