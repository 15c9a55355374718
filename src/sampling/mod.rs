//! Discrete distributions behind every simulated decision.
//!
//! All four decisions (action, rank, page, user) are drawn from one
//! primitive, [`WeightedCategorical`], parameterized differently.

mod categorical;
mod rank;
mod sampler;

pub use categorical::WeightedCategorical;
pub use rank::{harmonic, RankLaw};
pub use sampler::{Action, Sampler};
