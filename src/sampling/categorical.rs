//! Weighted categorical distribution.

use rand::Rng;

use crate::error::ValidationError;

/// A discrete distribution over `0..len`, sampled by inverting its
/// cumulative distribution function.
///
/// Weights need not sum to one; they are normalized on construction.
/// Zero weights are allowed and are never drawn.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use ranksim::sampling::WeightedCategorical;
///
/// let dist = WeightedCategorical::new(&[1.0, 3.0]).unwrap();
/// assert!((dist.probability(1) - 0.75).abs() < 1e-12);
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// assert!(dist.sample(&mut rng) < 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCategorical {
    cumulative: Vec<f64>,
}

impl WeightedCategorical {
    /// Builds the distribution from raw weights.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWeights` if `weights` is empty,
    /// contains a negative or non-finite value, or sums to zero.
    pub fn new(weights: &[f64]) -> Result<Self, ValidationError> {
        if weights.is_empty() {
            return Err(ValidationError::InvalidWeights {
                reason: "at least one weight is required".to_string(),
            });
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ValidationError::InvalidWeights {
                reason: format!("weights must be finite and non-negative, got {bad}"),
            });
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ValidationError::InvalidWeights {
                reason: "weights must not all be zero".to_string(),
            });
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w / total;
                running
            })
            .collect();

        // Rounding can leave the tail a hair below 1.0, which would make the
        // last category unreachable for draws close to 1.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self { cumulative })
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Normalized probability of category `index`, or 0 when out of range.
    #[must_use]
    pub fn probability(&self, index: usize) -> f64 {
        match index {
            i if i >= self.cumulative.len() => 0.0,
            0 => self.cumulative[0],
            i => self.cumulative[i] - self.cumulative[i - 1],
        }
    }

    /// Draws a category index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.gen();
        let idx = self.cumulative.partition_point(|&c| c <= u);
        idx.min(self.cumulative.len() - 1)
    }
}
