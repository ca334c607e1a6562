//! Ports for the assembler.

pub mod inbound;
pub mod outbound;
