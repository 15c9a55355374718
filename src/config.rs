//! Run configuration.
//!
//! Every knob has a default matching the reference traffic profile, so an
//! empty JSON object (or no file at all) is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, ValidationError};
use crate::sampling::WeightedCategorical;

/// Relative weights of the steady-state actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionWeights {
    pub post_item: f64,
    pub post_vote_event: f64,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            post_item: 0.05,
            post_vote_event: 0.95,
        }
    }
}

impl ActionWeights {
    /// Weights in [`Action::ALL`](crate::sampling::Action::ALL) order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 2] {
        [self.post_item, self.post_vote_event]
    }
}

/// Relative weights of the pages a voter is browsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageWeights {
    pub newest: f64,
    pub hacker_news: f64,
    pub quality_news: f64,
}

impl Default for PageWeights {
    fn default() -> Self {
        Self {
            newest: 0.45,
            hacker_news: 0.45,
            quality_news: 0.10,
        }
    }
}

impl PageWeights {
    /// Weights in [`PageId::ALL`](crate::model::PageId::ALL) order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.newest, self.hacker_news, self.quality_news]
    }
}

/// Shape and pacing of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Items submitted before steady-state traffic starts.
    pub seed_items: usize,
    /// Steady-state iterations.
    pub steady_iterations: usize,
    /// Wait between the seed phase and steady state, letting the service
    /// recompute its rankings.
    pub warmup_ms: u64,
    /// Fixed pause after every steady-state iteration.
    pub step_delay_ms: u64,
    /// Users are `user_1..=user_<user_pool_size>`.
    pub user_pool_size: u64,
    pub action_weights: ActionWeights,
    pub page_weights: PageWeights,
    /// Seed for the sampler; drawn from entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed_items: 10,
            steady_iterations: 1000,
            warmup_ms: 5_000,
            step_delay_ms: 500,
            user_pool_size: 100,
            action_weights: ActionWeights::default(),
            page_weights: PageWeights::default(),
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration.
    ///
    /// Must pass before an engine is built from it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_pool_size == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "user_pool_size must be > 0".to_string(),
            });
        }
        WeightedCategorical::new(&self.action_weights.as_array())?;
        WeightedCategorical::new(&self.page_weights.as_array())?;
        Ok(())
    }

    #[must_use]
    pub const fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// The integer members of the user pool.
    #[must_use]
    pub fn user_pool(&self) -> Vec<u64> {
        (1..=self.user_pool_size).collect()
    }
}

/// Where and how to reach the ranking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidConfig {
                reason: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "request_timeout_ms must be > 0".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Full configuration as stored in a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub gateway: GatewayConfig,
}

impl RunConfig {
    /// Loads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SimError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(raw: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| SimError::config(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.simulation.validate()?;
        self.gateway.validate()
    }
}
