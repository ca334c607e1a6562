//! Domain layer for the light client bridge.

pub mod consensus_state;
pub mod errors;
pub mod light_block;
pub mod value_objects;

pub use consensus_state::*;
pub use errors::*;
pub use light_block::*;
pub use value_objects::*;
