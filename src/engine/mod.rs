//! The simulation loop.
//!
//! A run has three parts:
//! 1. **Seed**: submit a fixed number of items so the pages are not empty.
//! 2. **Warm-up**: wait for the service to recompute its rankings.
//! 3. **Steady state**: a fixed number of paced iterations, each either
//!    posting an item or voting on an item seen on a ranking page.
//!
//! One logical actor acts at a time. Every gateway call is awaited before
//! the next decision is sampled, so ids are recorded strictly in the order
//! the service confirmed them.
//!
//! Failures are confined to the step that hit them: a rejected submission
//! is logged and leaves the id streams untouched, and an unreadable ranking
//! aborts only the current iteration. Validation errors are not step-local
//! and end the run.

mod report;
mod state;

use std::time::Instant;

use tracing::{debug, info, warn};

pub use report::{SimulationReport, StepOutcome};
pub use state::SimulationState;

use crate::config::SimulationConfig;
use crate::error::{SimResult, ValidationError};
use crate::gateway::Gateway;
use crate::ids::IdAllocator;
use crate::model::{Item, PageId, ScoredItem, UserId, VoteEvent};
use crate::sampling::{Action, Sampler};

/// Steady-state iterations between progress lines.
const PROGRESS_INTERVAL: usize = 100;

/// Drives seed and steady-state traffic against a [`Gateway`].
pub struct SimulationEngine<G> {
    config: SimulationConfig,
    gateway: G,
    sampler: Sampler,
    state: SimulationState,
    report: SimulationReport,
}

impl<G: Gateway> SimulationEngine<G> {
    /// Creates an engine, seeding its sampler from the configuration.
    pub fn new(config: SimulationConfig, gateway: G) -> SimResult<Self> {
        config.validate()?;
        let sampler = Sampler::from_config(&config)?;
        Ok(Self::with_sampler(config, gateway, sampler))
    }

    /// Creates an engine around an existing sampler.
    ///
    /// The configuration's weights and seed are ignored in favor of the
    /// sampler's own.
    #[must_use]
    pub fn with_sampler(config: SimulationConfig, gateway: G, sampler: Sampler) -> Self {
        let state = SimulationState::new(config.user_pool());
        let report = SimulationReport::new(sampler.seed());
        Self {
            config,
            gateway,
            sampler,
            state,
            report,
        }
    }

    /// Ids confirmed so far and the user pool.
    #[must_use]
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The gateway traffic is sent through.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn report(&self) -> &SimulationReport {
        &self.report
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs seed, warm-up and steady state to completion.
    ///
    /// # Errors
    ///
    /// Only errors that are not local to a step end the run early; gateway
    /// failures are logged, counted, and skipped.
    pub async fn run(&mut self) -> SimResult<SimulationReport> {
        let started = Instant::now();
        info!(
            rng_seed = self.sampler.seed(),
            seed_items = self.config.seed_items,
            steady_iterations = self.config.steady_iterations,
            step_delay_ms = self.config.step_delay_ms,
            users = self.state.user_pool().len(),
            "Running simulation"
        );

        self.seed_phase().await?;
        self.warm_up().await;
        self.steady_state_phase(started).await?;

        self.report.elapsed = started.elapsed();
        info!(report = %self.report, "Finished simulation");
        Ok(self.report.clone())
    }

    /// Submits the configured number of seed items, without pacing.
    pub async fn seed_phase(&mut self) -> SimResult<()> {
        info!(count = self.config.seed_items, "Seeding items");
        for _ in 0..self.config.seed_items {
            let author = self.sampler.choose_user(self.state.user_pool())?;
            let outcome = self.post_item(author).await?;
            self.report.record(&outcome);
        }
        info!(
            accepted = self.state.items().len(),
            requested = self.config.seed_items,
            "Seed phase complete"
        );
        Ok(())
    }

    /// Waits for the service's rankings to settle after seeding.
    pub async fn warm_up(&self) {
        let warmup = self.config.warmup();
        if warmup.is_zero() {
            return;
        }
        info!(warmup_ms = self.config.warmup_ms, "Waiting for rankings to settle");
        tokio::time::sleep(warmup).await;
    }

    async fn steady_state_phase(&mut self, started: Instant) -> SimResult<()> {
        info!(iterations = self.config.steady_iterations, "Starting steady-state traffic");
        let step_delay = self.config.step_delay();

        for iteration in 1..=self.config.steady_iterations {
            match self.step().await {
                Ok(outcome) => self.report.record(&outcome),
                Err(err) if err.is_step_local() => {
                    warn!(iteration, error = %err, "Steady-state iteration aborted");
                    self.report.record_aborted(&err);
                }
                Err(err) => return Err(err),
            }

            if iteration % PROGRESS_INTERVAL == 0 {
                self.report.elapsed = started.elapsed();
                info!(iteration, report = %self.report, "Progress");
            }

            tokio::time::sleep(step_delay).await;
        }
        Ok(())
    }

    /// Performs one steady-state iteration, without the pacing delay.
    ///
    /// # Errors
    ///
    /// Returns a gateway error if the ranking for a vote could not be read,
    /// and a validation error if a decision could not be sampled.
    pub async fn step(&mut self) -> SimResult<StepOutcome> {
        let action = self.sampler.choose_action();
        let user = self.sampler.choose_user(self.state.user_pool())?;

        match action {
            Action::PostItem => self.post_item(user).await,
            Action::PostVoteEvent => {
                let page = self.sampler.choose_page();
                let snapshot = self.gateway.get_ranking(page).await?;
                if snapshot.is_empty() {
                    debug!(%page, "Ranking is empty, nothing to vote on");
                    return Ok(StepOutcome::RankingEmpty(page));
                }
                let rank = self.sampler.choose_rank(snapshot.len())?;
                self.vote_at_rank(user, page, &snapshot, rank).await
            }
        }
    }

    async fn post_item(&mut self, author: UserId) -> SimResult<StepOutcome> {
        let item_id = IdAllocator::next(self.state.items());
        let item = Item::new(item_id, author);

        match self.gateway.post_item(&item).await {
            Ok(()) => {
                self.state.record_item(item_id)?;
                debug!(%item_id, author = %item.author_id, "Posted item");
                Ok(StepOutcome::ItemSubmitted(item_id))
            }
            Err(err) => {
                warn!(%item_id, error = %err, "Failed to post item");
                Ok(StepOutcome::ItemRejected(item_id))
            }
        }
    }

    /// Casts `user`'s upvote on the item at 1-based `rank` of `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInput` if `rank` is outside
    /// `1..=snapshot.len()`.
    pub async fn vote_at_rank(
        &mut self,
        user: UserId,
        page: PageId,
        snapshot: &[ScoredItem],
        rank: u32,
    ) -> SimResult<StepOutcome> {
        let target = rank
            .checked_sub(1)
            .and_then(|idx| snapshot.get(idx as usize))
            .ok_or_else(|| {
                ValidationError::invalid_input(format!(
                    "rank {rank} outside snapshot of {} items",
                    snapshot.len()
                ))
            })?;

        let vote_event_id = IdAllocator::next(self.state.vote_events());
        let vote = VoteEvent::upvote(vote_event_id, target.item_id, user, rank, page);

        match self.gateway.post_vote_event(&vote).await {
            Ok(()) => {
                self.state.record_vote_event(vote_event_id)?;
                debug!(
                    %vote_event_id,
                    item_id = %vote.item_id,
                    rank,
                    %page,
                    user = %vote.user_id,
                    "Posted vote event"
                );
                Ok(StepOutcome::VoteSubmitted {
                    vote_event_id,
                    item_id: vote.item_id,
                    rank,
                    page,
                })
            }
            Err(err) => {
                warn!(%vote_event_id, %page, error = %err, "Failed to post vote event");
                Ok(StepOutcome::VoteRejected {
                    vote_event_id,
                    page,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActionWeights, PageWeights};
    use crate::gateway::InMemoryGateway;
    use crate::ids::{ItemId, VoteEventId};

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            seed_items: 10,
            steady_iterations: 0,
            warmup_ms: 0,
            step_delay_ms: 0,
            user_pool_size: 5,
            rng_seed: Some(17),
            ..SimulationConfig::default()
        }
    }

    fn snapshot(ids: &[u64], page: PageId) -> Vec<ScoredItem> {
        ids.iter()
            .zip(1u32..)
            .map(|(&id, rank)| ScoredItem {
                item_id: ItemId::new(id),
                rank,
                page,
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig {
            user_pool_size: 0,
            ..quiet_config()
        };
        let result = SimulationEngine::new(config, InMemoryGateway::new());
        assert!(matches!(result, Err(e) if e.is_validation()));
    }

    #[tokio::test]
    async fn test_seed_phase_issues_sequential_ids() {
        let mut engine = SimulationEngine::new(quiet_config(), InMemoryGateway::new()).unwrap();
        engine.seed_phase().await.unwrap();

        let ids: Vec<u64> = engine.state().items().iter().map(ItemId::get).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(engine.report().items_submitted, 10);
    }

    #[tokio::test]
    async fn test_seed_failure_does_not_consume_id() {
        let gateway = InMemoryGateway::new();
        gateway.reject_next_items(3);
        let mut engine = SimulationEngine::new(quiet_config(), gateway).unwrap();
        engine.seed_phase().await.unwrap();

        let ids: Vec<u64> = engine.state().items().iter().map(ItemId::get).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
        assert_eq!(engine.report().items_rejected, 3);
    }

    #[tokio::test]
    async fn test_vote_at_rank_targets_snapshot_entry() {
        let mut engine = SimulationEngine::new(quiet_config(), InMemoryGateway::new()).unwrap();
        let snap = snapshot(&[50, 40, 30, 20, 10], PageId::HackerNews);

        let outcome = engine
            .vote_at_rank(UserId::from_pool(2), PageId::HackerNews, &snap, 3)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StepOutcome::VoteSubmitted {
                vote_event_id: VoteEventId::new(1),
                item_id: ItemId::new(30),
                rank: 3,
                page: PageId::HackerNews,
            }
        );
        let sent = engine.gateway().vote_events();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].item_id, snap[2].item_id);
        assert_eq!(sent[0].rank, Some(3));
    }

    #[tokio::test]
    async fn test_vote_at_rank_out_of_range() {
        let mut engine = SimulationEngine::new(quiet_config(), InMemoryGateway::new()).unwrap();
        let snap = snapshot(&[1, 2], PageId::Newest);

        for rank in [0, 3] {
            let err = engine
                .vote_at_rank(UserId::from_pool(1), PageId::Newest, &snap, rank)
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert!(engine.state().vote_events().is_empty());
    }

    #[tokio::test]
    async fn test_step_vote_uses_sampled_rank() {
        let config = SimulationConfig {
            action_weights: ActionWeights {
                post_item: 0.0,
                post_vote_event: 1.0,
            },
            page_weights: PageWeights {
                newest: 0.0,
                hacker_news: 0.0,
                quality_news: 1.0,
            },
            ..quiet_config()
        };
        let gateway = InMemoryGateway::new();
        let snap = snapshot(&[9, 8, 7, 6, 5], PageId::QualityNews);
        gateway.set_ranking(PageId::QualityNews, snap.clone());
        let mut engine = SimulationEngine::new(config, gateway).unwrap();

        for _ in 0..50 {
            let StepOutcome::VoteSubmitted {
                item_id, rank, page, ..
            } = engine.step().await.unwrap()
            else {
                panic!("expected a submitted vote");
            };
            assert!((1..=5).contains(&rank));
            assert_eq!(item_id, snap[rank as usize - 1].item_id);
            assert_eq!(page, PageId::QualityNews);
        }
        assert_eq!(engine.state().vote_events().len(), 50);
    }

    #[tokio::test]
    async fn test_step_on_empty_ranking() {
        let config = SimulationConfig {
            action_weights: ActionWeights {
                post_item: 0.0,
                post_vote_event: 1.0,
            },
            ..quiet_config()
        };
        let mut engine = SimulationEngine::new(config, InMemoryGateway::new()).unwrap();
        let outcome = engine.step().await.unwrap();
        assert!(matches!(outcome, StepOutcome::RankingEmpty(_)));
        assert!(engine.state().vote_events().is_empty());
    }

    #[tokio::test]
    async fn test_step_malformed_ranking_is_step_local() {
        let config = SimulationConfig {
            action_weights: ActionWeights {
                post_item: 0.0,
                post_vote_event: 1.0,
            },
            page_weights: PageWeights {
                newest: 1.0,
                hacker_news: 0.0,
                quality_news: 0.0,
            },
            ..quiet_config()
        };
        let gateway = InMemoryGateway::new();
        gateway.set_malformed(PageId::Newest);
        let mut engine = SimulationEngine::new(config, gateway).unwrap();

        let err = engine.step().await.unwrap_err();
        assert!(err.is_step_local());
    }
}
