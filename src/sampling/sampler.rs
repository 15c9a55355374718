//! Decision sampler for the simulation loop.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{ActionWeights, PageWeights, SimulationConfig};
use crate::error::ValidationError;
use crate::model::{PageId, UserId};
use crate::sampling::{RankLaw, WeightedCategorical};

/// What a simulated user does in a steady-state step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    PostItem,
    PostVoteEvent,
}

impl Action {
    /// Every action, in weight order.
    pub const ALL: [Self; 2] = [Self::PostItem, Self::PostVoteEvent];
}

/// Draws every random decision the engine makes.
///
/// Draws are independent of one another. A fixed seed reproduces the same
/// decision sequence.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: ChaCha8Rng,
    seed: u64,
    actions: WeightedCategorical,
    pages: WeightedCategorical,
    // Consecutive snapshots usually have the same length.
    rank_law: Option<RankLaw>,
    uniform_users: Option<WeightedCategorical>,
}

impl Sampler {
    /// Creates a sampler with explicit weights.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWeights` if either weight vector is
    /// unusable.
    pub fn new(
        action_weights: &ActionWeights,
        page_weights: &PageWeights,
        seed: u64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            actions: WeightedCategorical::new(&action_weights.as_array())?,
            pages: WeightedCategorical::new(&page_weights.as_array())?,
            rank_law: None,
            uniform_users: None,
        })
    }

    /// Creates a sampler from a run configuration, drawing a seed from
    /// entropy if none is configured.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ValidationError> {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        Self::new(&config.action_weights, &config.page_weights, seed)
    }

    /// The seed this sampler was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn choose_action(&mut self) -> Action {
        Action::ALL[self.actions.sample(&mut self.rng)]
    }

    /// Draws a 1-based rank on a page of `n_ranks` entries, biased toward
    /// the top of the page.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInput` if `n_ranks` is zero or does
    /// not fit a `u32`.
    pub fn choose_rank(&mut self, n_ranks: usize) -> Result<u32, ValidationError> {
        let n = u32::try_from(n_ranks).map_err(|_| {
            ValidationError::invalid_input(format!("n_ranks {n_ranks} exceeds u32::MAX"))
        })?;

        let law = match self.rank_law.take() {
            Some(law) if law.n_ranks() == n => law,
            _ => RankLaw::new(n)?,
        };
        let rank = law.sample(&mut self.rng);
        self.rank_law = Some(law);
        Ok(rank)
    }

    pub fn choose_page(&mut self) -> PageId {
        PageId::ALL[self.pages.sample(&mut self.rng)]
    }

    /// Picks a pool member uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInput` if `pool` is empty.
    pub fn choose_user(&mut self, pool: &[u64]) -> Result<UserId, ValidationError> {
        if pool.is_empty() {
            return Err(ValidationError::invalid_input("user pool is empty"));
        }

        let dist = match self.uniform_users.take() {
            Some(dist) if dist.len() == pool.len() => dist,
            _ => WeightedCategorical::new(&vec![1.0; pool.len()])?,
        };
        let user = UserId::from_pool(pool[dist.sample(&mut self.rng)]);
        self.uniform_users = Some(dist);
        Ok(user)
    }
}
