//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A configuration value is outside its permitted range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Latency range whose lower bound exceeds its upper bound
    #[error("Invalid latency range: {min_ms}ms exceeds {max_ms}ms")]
    InvalidLatencyRange { min_ms: u64, max_ms: u64 },

    /// Unknown demo scenario number
    #[error("Invalid scenario number: {0} (valid scenarios: 1, 2, 3, 4)")]
    InvalidScenario(u8),
}

impl DomainError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
