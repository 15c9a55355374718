//! Rank-bias law for choosing which position on a page gets a vote.
//!
//! Attention on a ranked page falls off roughly as `1/r`: the item at
//! rank `r` is picked with probability `(1/r) / H_n`, where `H_n` is
//! the n-th harmonic number.

use rand::Rng;

use crate::error::ValidationError;
use crate::sampling::WeightedCategorical;

/// Zipf-like distribution over ranks `1..=n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankLaw {
    n_ranks: u32,
    dist: WeightedCategorical,
}

impl RankLaw {
    /// Builds the law for a page with `n_ranks` entries.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidInput` if `n_ranks` is zero.
    pub fn new(n_ranks: u32) -> Result<Self, ValidationError> {
        if n_ranks == 0 {
            return Err(ValidationError::invalid_input(
                "n_ranks must be >= 1 to sample a rank, got 0",
            ));
        }
        let weights: Vec<f64> = (1..=n_ranks).map(|r| 1.0 / f64::from(r)).collect();
        let dist = WeightedCategorical::new(&weights)?;
        Ok(Self { n_ranks, dist })
    }

    #[must_use]
    pub const fn n_ranks(&self) -> u32 {
        self.n_ranks
    }

    /// Probability of drawing `rank`; 0 outside `1..=n_ranks`.
    #[must_use]
    pub fn probability(&self, rank: u32) -> f64 {
        if rank == 0 {
            return 0.0;
        }
        self.dist.probability(rank as usize - 1)
    }

    /// Draws a 1-based rank.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let idx = self.dist.sample(rng);
        u32::try_from(idx).map_or(self.n_ranks, |i| i + 1)
    }
}

/// The n-th harmonic number, `Σ_{k=1..n} 1/k`.
#[must_use]
pub fn harmonic(n: u32) -> f64 {
    (1..=n).map(|k| 1.0 / f64::from(k)).sum()
}
