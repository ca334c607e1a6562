//! Scriptable roster source for tests and local runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ChainError, ChainResult, RosterMember};

use crate::ports::outbound::RosterSource;

/// Roster source returning a settable roster.
pub struct MockRosterSource<M> {
    roster: RwLock<Vec<M>>,
    should_fail: AtomicBool,
    queries: AtomicUsize,
}

impl<M: RosterMember> MockRosterSource<M> {
    /// Creates a source reporting `roster`.
    pub fn new(roster: Vec<M>) -> Self {
        Self {
            roster: RwLock::new(roster),
            should_fail: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    /// Replaces the reported roster.
    pub fn set_roster(&self, roster: Vec<M>) {
        *self.roster.write() = roster;
    }

    /// Makes every query fail with a transient error.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of queries served, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<M: RosterMember> RosterSource for MockRosterSource<M> {
    type Member = M;

    async fn query_latest_roster(&self) -> ChainResult<Vec<M>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transient("roster endpoint unavailable".into()));
        }
        Ok(self.roster.read().clone())
    }
}
