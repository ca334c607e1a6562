//! # Inbound Ports
//!
//! What the rest of the relayer consumes from the cache.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::RosterMember;

use crate::error::RosterResult;

/// Read access to a canonical roster.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Roster member shape.
    type Member: RosterMember;

    /// The current roster, in canonical chain order.
    async fn roster(&self) -> RosterResult<Arc<Vec<Self::Member>>>;
}
