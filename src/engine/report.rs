//! Per-step outcomes and the end-of-run report.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::SimError;
use crate::ids::{ItemId, VoteEventId};
use crate::model::PageId;

/// What a single seed or steady-state step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The service accepted a new item.
    ItemSubmitted(ItemId),
    /// The item was not accepted; its id was not consumed.
    ItemRejected(ItemId),
    /// The service accepted a vote.
    VoteSubmitted {
        vote_event_id: VoteEventId,
        item_id: ItemId,
        rank: u32,
        page: PageId,
    },
    /// The vote was not accepted; its id was not consumed.
    VoteRejected {
        vote_event_id: VoteEventId,
        page: PageId,
    },
    /// The page had nothing to vote on.
    RankingEmpty(PageId),
}

/// Counters for a finished (or in-progress) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Seed the sampler ran with; replaying it reproduces the decisions.
    pub rng_seed: u64,
    /// Items the service accepted.
    pub items_submitted: u64,
    /// Items the service did not accept.
    pub items_rejected: u64,
    /// Votes the service accepted.
    pub votes_submitted: u64,
    /// Votes the service did not accept.
    pub votes_rejected: u64,
    /// Steady-state iterations aborted because a ranking could not be read.
    pub ranking_failures: u64,
    /// Vote iterations skipped because the page was empty.
    pub empty_rankings: u64,
    /// Accepted votes per page, in `PageId::ALL` order.
    pub votes_by_page: [u64; 3],
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// An empty report for a run seeded with `rng_seed`.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    /// Counts one step outcome.
    pub fn record(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::ItemSubmitted(_) => self.items_submitted += 1,
            StepOutcome::ItemRejected(_) => self.items_rejected += 1,
            StepOutcome::VoteSubmitted { page, .. } => {
                self.votes_submitted += 1;
                self.votes_by_page[page.index()] += 1;
            }
            StepOutcome::VoteRejected { .. } => self.votes_rejected += 1,
            StepOutcome::RankingEmpty(_) => self.empty_rankings += 1,
        }
    }

    /// Records an iteration that ended in a step-local error.
    pub fn record_aborted(&mut self, err: &SimError) {
        if err.is_gateway() {
            self.ranking_failures += 1;
        }
    }

    /// Accepted votes cast from `page`.
    #[must_use]
    pub const fn votes_on(&self, page: PageId) -> u64 {
        self.votes_by_page[page.index()]
    }

    /// Submissions attempted, accepted or not.
    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.items_submitted + self.items_rejected + self.votes_submitted + self.votes_rejected
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>4}s] items: {} ok / {} failed | votes: {} ok / {} failed \
             (newest {}, hn {}, qn {}) | ranking failures: {} | empty rankings: {} | seed: {}",
            self.elapsed.as_secs(),
            self.items_submitted,
            self.items_rejected,
            self.votes_submitted,
            self.votes_rejected,
            self.votes_on(PageId::Newest),
            self.votes_on(PageId::HackerNews),
            self.votes_on(PageId::QualityNews),
            self.ranking_failures,
            self.empty_rankings,
            self.rng_seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, ValidationError};

    #[test]
    fn test_record_counts_outcomes() {
        let mut report = SimulationReport::new(5);
        report.record(&StepOutcome::ItemSubmitted(ItemId::new(1)));
        report.record(&StepOutcome::ItemRejected(ItemId::new(2)));
        report.record(&StepOutcome::VoteSubmitted {
            vote_event_id: VoteEventId::new(1),
            item_id: ItemId::new(1),
            rank: 1,
            page: PageId::QualityNews,
        });
        report.record(&StepOutcome::VoteRejected {
            vote_event_id: VoteEventId::new(2),
            page: PageId::Newest,
        });
        report.record(&StepOutcome::RankingEmpty(PageId::HackerNews));

        assert_eq!(report.items_submitted, 1);
        assert_eq!(report.items_rejected, 1);
        assert_eq!(report.votes_submitted, 1);
        assert_eq!(report.votes_rejected, 1);
        assert_eq!(report.empty_rankings, 1);
        assert_eq!(report.votes_on(PageId::QualityNews), 1);
        assert_eq!(report.votes_on(PageId::Newest), 0);
        assert_eq!(report.attempted(), 4);
    }

    #[test]
    fn test_record_aborted_counts_gateway_errors_only() {
        let mut report = SimulationReport::default();
        report.record_aborted(&SimError::from(GatewayError::MalformedRanking {
            reason: "object".to_string(),
        }));
        report.record_aborted(&SimError::from(ValidationError::invalid_input("x")));
        assert_eq!(report.ranking_failures, 1);
    }

    #[test]
    fn test_display_summary() {
        let report = SimulationReport {
            rng_seed: 77,
            items_submitted: 3,
            ..SimulationReport::default()
        };
        let line = report.to_string();
        assert!(line.contains("items: 3 ok"));
        assert!(line.contains("seed: 77"));
    }
}
