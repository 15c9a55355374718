//! State owned by a running simulation.

use crate::error::ValidationError;
use crate::ids::{IdStream, ItemId, VoteEventId};

/// Ids confirmed so far and the users who may act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    items: IdStream<ItemId>,
    vote_events: IdStream<VoteEventId>,
    user_pool: Vec<u64>,
}

impl SimulationState {
    /// Fresh state with no confirmed ids.
    #[must_use]
    pub fn new(user_pool: Vec<u64>) -> Self {
        Self {
            items: IdStream::new(),
            vote_events: IdStream::new(),
            user_pool,
        }
    }

    /// Item ids the service has accepted.
    #[must_use]
    pub const fn items(&self) -> &IdStream<ItemId> {
        &self.items
    }

    /// Vote-event ids the service has accepted.
    #[must_use]
    pub const fn vote_events(&self) -> &IdStream<VoteEventId> {
        &self.vote_events
    }

    /// Integer members of the user pool.
    #[must_use]
    pub fn user_pool(&self) -> &[u64] {
        &self.user_pool
    }

    pub(crate) fn record_item(&mut self, id: ItemId) -> Result<(), ValidationError> {
        self.items.record(id)
    }

    pub(crate) fn record_vote_event(&mut self, id: VoteEventId) -> Result<(), ValidationError> {
        self.vote_events.record(id)
    }
}
