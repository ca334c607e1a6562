//! Domain layer for vote aggregation.

pub mod bitset;
pub mod bls;
pub mod event;
