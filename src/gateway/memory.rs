//! In-memory gateway.
//!
//! Behaves like a minimal ranking service: it stores accepted items and
//! votes and ranks them on request. Tests can override a page's snapshot,
//! make a page return a malformed body, or reject upcoming submissions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::ids::ItemId;
use crate::model::{Item, PageId, ScoredItem, VoteEvent};

/// Longest ranking the service returns for a page.
pub const MAX_RANKING_LEN: usize = 1500;

#[derive(Debug, Default)]
struct GatewayState {
    items: Vec<Item>,
    vote_events: Vec<VoteEvent>,
    upvotes: HashMap<ItemId, u64>,
    fixed_rankings: HashMap<PageId, Vec<ScoredItem>>,
    malformed_pages: HashSet<PageId>,
    reject_items: usize,
    reject_vote_events: usize,
    ranking_requests: usize,
}

impl GatewayState {
    #[allow(clippy::cast_precision_loss)]
    fn rank(&self, page: PageId) -> Vec<ScoredItem> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        let votes = |item: &Item| self.upvotes.get(&item.item_id).copied().unwrap_or(0);

        // Newest first; vote-ranked pages fall back to recency on ties.
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.item_id.cmp(&a.item_id))
        });
        if page != PageId::Newest {
            items.sort_by_key(|item| std::cmp::Reverse(votes(*item)));
        }

        items
            .into_iter()
            .take(MAX_RANKING_LEN)
            .zip(1u32..)
            .map(|(item, rank)| ScoredItem {
                item_id: item.item_id,
                rank,
                page,
                score: match page {
                    PageId::Newest => 1.0 / rank as f32,
                    PageId::HackerNews | PageId::QualityNews => votes(item) as f32,
                },
            })
            .collect()
    }
}

fn lock_err() -> GatewayError {
    GatewayError::Transport {
        message: "poisoned lock: in-memory gateway".to_string(),
    }
}

fn rejected(what: &str) -> GatewayError {
    GatewayError::Status {
        code: 503,
        body: format!("{what} rejected by in-memory gateway"),
    }
}

/// A self-contained stand-in for the ranking service.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<GatewayState>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the next `n` item submissions.
    pub fn reject_next_items(&self, n: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.reject_items += n;
        }
    }

    /// Rejects the next `n` vote-event submissions.
    pub fn reject_next_vote_events(&self, n: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.reject_vote_events += n;
        }
    }

    /// Serves `snapshot` for `page` instead of ranking stored items.
    pub fn set_ranking(&self, page: PageId, snapshot: Vec<ScoredItem>) {
        if let Ok(mut state) = self.state.lock() {
            state.fixed_rankings.insert(page, snapshot);
        }
    }

    /// Makes `page` answer with a body that is not a sequence.
    pub fn set_malformed(&self, page: PageId) {
        if let Ok(mut state) = self.state.lock() {
            state.malformed_pages.insert(page);
        }
    }

    /// Items accepted so far, in submission order.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.state
            .lock()
            .map(|s| s.items.clone())
            .unwrap_or_default()
    }

    /// Vote events accepted so far, in submission order.
    #[must_use]
    pub fn vote_events(&self) -> Vec<VoteEvent> {
        self.state
            .lock()
            .map(|s| s.vote_events.clone())
            .unwrap_or_default()
    }

    /// Number of ranking fetches served, including malformed ones.
    #[must_use]
    pub fn ranking_requests(&self) -> usize {
        self.state.lock().map(|s| s.ranking_requests).unwrap_or(0)
    }
}

impl Gateway for InMemoryGateway {
    async fn post_item(&self, item: &Item) -> Result<(), GatewayError> {
        let mut state = self.state.lock().map_err(|_| lock_err())?;
        if state.reject_items > 0 {
            state.reject_items -= 1;
            return Err(rejected("item"));
        }
        if state.items.iter().any(|i| i.item_id == item.item_id) {
            return Err(GatewayError::Status {
                code: 500,
                body: format!("duplicate item_id {}", item.item_id),
            });
        }
        state.items.push(item.clone());
        Ok(())
    }

    async fn post_vote_event(&self, vote_event: &VoteEvent) -> Result<(), GatewayError> {
        let mut state = self.state.lock().map_err(|_| lock_err())?;
        if state.reject_vote_events > 0 {
            state.reject_vote_events -= 1;
            return Err(rejected("vote event"));
        }
        if state
            .vote_events
            .iter()
            .any(|v| v.vote_event_id == vote_event.vote_event_id)
        {
            return Err(GatewayError::Status {
                code: 500,
                body: format!("duplicate vote_event_id {}", vote_event.vote_event_id),
            });
        }
        if vote_event.vote > 0 {
            *state.upvotes.entry(vote_event.item_id).or_default() += 1;
        }
        state.vote_events.push(vote_event.clone());
        Ok(())
    }

    async fn get_ranking(&self, page: PageId) -> Result<Vec<ScoredItem>, GatewayError> {
        let mut state = self.state.lock().map_err(|_| lock_err())?;
        state.ranking_requests += 1;
        if state.malformed_pages.contains(&page) {
            return Err(GatewayError::MalformedRanking {
                reason: "expected a JSON array, got an object".to_string(),
            });
        }
        if let Some(snapshot) = state.fixed_rankings.get(&page) {
            return Ok(snapshot.clone());
        }
        Ok(state.rank(page))
    }
}
