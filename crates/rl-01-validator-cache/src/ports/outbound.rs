//! # Outbound Ports
//!
//! Chain query the cache refreshes from.

use async_trait::async_trait;
use shared_types::{ChainResult, RosterMember};

/// Chain RPC returning the latest roster.
#[async_trait]
pub trait RosterSource: Send + Sync + 'static {
    /// Roster member shape this chain reports.
    type Member: RosterMember;

    /// Queries the latest roster in canonical order.
    async fn query_latest_roster(&self) -> ChainResult<Vec<Self::Member>>;
}
