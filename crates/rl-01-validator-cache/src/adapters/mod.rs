//! Adapters for the validator cache.

pub mod mock_source;

pub use mock_source::MockRosterSource;
