//! Error types for ranksim.
//!
//! All errors are strongly typed using thiserror so callers can match
//! on the failure class: bad input is rejected up front, gateway
//! failures are recovered by the engine one step at a time.

use thiserror::Error;

/// Validation errors raised before any traffic is generated.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid input: {reason}")]
    InvalidInput {
        reason: String,
    },

    #[error("Invalid weights: {reason}")]
    InvalidWeights {
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Id {attempted} does not follow the last recorded id {last}")]
    NonMonotonicId {
        last: u64,
        attempted: u64,
    },
}

impl ValidationError {
    /// Creates an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors reported by a [`Gateway`](crate::gateway::Gateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport failure: {message}")]
    Transport {
        message: String,
    },

    #[error("Service returned status {code}: {body}")]
    Status {
        code: u16,
        body: String,
    },

    #[error("Malformed ranking response: {reason}")]
    MalformedRanking {
        reason: String,
    },

    #[error("Failed to encode request: {message}")]
    Encoding {
        message: String,
    },
}

impl GatewayError {
    /// Returns true if the service answered but rejected the request.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Returns true if the ranking body could not be interpreted.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRanking { .. })
    }
}

/// Top-level error type for ranksim.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl SimError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a gateway error.
    #[must_use]
    pub const fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }

    /// Returns true if the failure is confined to a single simulation step.
    ///
    /// Gateway failures only cost the step that hit them; validation and
    /// configuration errors indicate the run itself is misconfigured.
    #[must_use]
    pub const fn is_step_local(&self) -> bool {
        self.is_gateway()
    }
}

/// Result type alias for ranksim operations.
pub type SimResult<T> = Result<T, SimError>;
