//! # Inbound Ports
//!
//! What the runtime drives an assembler through.

use async_trait::async_trait;

use crate::domain::Role;
use crate::error::AssemblerResult;
use crate::service::TickReport;

/// One direction's assembler.
#[async_trait]
pub trait AssemblerApi: Send + Sync {
    /// Runs one tick: leadership, window, then every channel concurrently.
    async fn tick(&self) -> AssemblerResult<TickReport>;

    /// Role the last tick ran in.
    fn role(&self) -> Role;

    /// Whether any delivery is delayed past the alert threshold.
    fn has_delayed_deliveries(&self) -> bool;
}
