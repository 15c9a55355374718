//! # ranksim - Traffic Simulator for Ranking Services
//!
//! ranksim drives a news-aggregator ranking service with synthetic traffic:
//! users post items and upvote items they see on one of the ranking pages.
//! The point is to generate data that looks like real browsing, where the
//! chance of voting on an item falls off with its rank on the page.
//!
//! ## Core Concepts
//!
//! - **Item**: A submitted post, identified by a strictly increasing id
//! - **VoteEvent**: An upvote cast from a specific page at a specific rank
//! - **Ranking**: The ordered snapshot a page serves, best first
//! - **Gateway**: The client-side contract of the ranking service
//! - **Sampler**: Seedable source of every random decision the simulator makes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ranksim::{InMemoryGateway, SimulationConfig, SimulationEngine};
//!
//! let config = SimulationConfig {
//!     rng_seed: Some(42),
//!     ..SimulationConfig::default()
//! };
//! let mut engine = SimulationEngine::new(config, InMemoryGateway::new())?;
//! let report = engine.run().await?;
//! println!("{report}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod ids;
pub mod model;
pub mod time;

// Decisions and configuration
pub mod config;
pub mod sampling;

// Service access and the simulation loop
pub mod engine;
pub mod gateway;

// Re-export primary types at crate root for convenience
pub use config::{ActionWeights, GatewayConfig, PageWeights, RunConfig, SimulationConfig};
pub use engine::{SimulationEngine, SimulationReport, SimulationState, StepOutcome};
pub use error::{GatewayError, SimError, SimResult, ValidationError};
pub use gateway::{Gateway, HttpGateway, InMemoryGateway};
pub use ids::{IdAllocator, IdStream, ItemId, SequenceId, VoteEventId};
pub use model::{Item, PageId, ScoredItem, UserId, VoteEvent};
pub use sampling::{Action, RankLaw, Sampler, WeightedCategorical};
pub use time::Timestamp;
