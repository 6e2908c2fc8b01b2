//! Circuit breaker thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::DomainError;

/// Configuration for a circuit breaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failure rate in percent at or above which the circuit opens
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f64,

    /// Outcomes that must be recorded before the failure rate is evaluated
    #[serde(default = "default_minimum_number_of_calls")]
    pub minimum_number_of_calls: u32,

    /// Number of most recent outcomes kept in the sliding window
    #[serde(default = "default_sliding_window_size")]
    pub sliding_window_size: u32,

    /// Cool-down in milliseconds before an open circuit lets a probe through
    #[serde(default = "default_wait_duration_in_open_state_ms")]
    pub wait_duration_in_open_state_ms: u64,

    /// Consecutive successful probes needed to close a half-open circuit
    #[serde(default = "default_permitted_calls_in_half_open_state")]
    pub permitted_number_of_calls_in_half_open_state: u32,
}

const fn default_failure_rate_threshold() -> f64 {
    50.0
}

const fn default_minimum_number_of_calls() -> u32 {
    5
}

const fn default_sliding_window_size() -> u32 {
    10
}

const fn default_wait_duration_in_open_state_ms() -> u64 {
    10_000
}

const fn default_permitted_calls_in_half_open_state() -> u32 {
    3
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: default_failure_rate_threshold(),
            minimum_number_of_calls: default_minimum_number_of_calls(),
            sliding_window_size: default_sliding_window_size(),
            wait_duration_in_open_state_ms: default_wait_duration_in_open_state_ms(),
            permitted_number_of_calls_in_half_open_state:
                default_permitted_calls_in_half_open_state(),
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a configuration for a sensitive/critical service (trips early)
    #[must_use]
    pub const fn sensitive() -> Self {
        Self {
            failure_rate_threshold: 25.0,
            minimum_number_of_calls: 3,
            sliding_window_size: 5,
            wait_duration_in_open_state_ms: 5_000,
            permitted_number_of_calls_in_half_open_state: 1,
        }
    }

    /// Creates a configuration for a resilient service (tolerates more noise)
    #[must_use]
    pub const fn resilient() -> Self {
        Self {
            failure_rate_threshold: 75.0,
            minimum_number_of_calls: 20,
            sliding_window_size: 50,
            wait_duration_in_open_state_ms: 60_000,
            permitted_number_of_calls_in_half_open_state: 5,
        }
    }

    /// Creates a custom configuration
    #[must_use]
    pub const fn custom(
        failure_rate_threshold: f64,
        minimum_number_of_calls: u32,
        sliding_window_size: u32,
        wait_duration_in_open_state: Duration,
        permitted_number_of_calls_in_half_open_state: u32,
    ) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let wait_ms = wait_duration_in_open_state.as_millis() as u64;
        Self {
            failure_rate_threshold,
            minimum_number_of_calls,
            sliding_window_size,
            wait_duration_in_open_state_ms: wait_ms,
            permitted_number_of_calls_in_half_open_state,
        }
    }

    /// Cool-down as a duration
    #[must_use]
    pub const fn wait_duration_in_open_state(&self) -> Duration {
        Duration::from_millis(self.wait_duration_in_open_state_ms)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 100.0) {
            return Err(DomainError::invalid_configuration(format!(
                "failure_rate_threshold must be in (0, 100], got {}",
                self.failure_rate_threshold
            )));
        }
        if self.sliding_window_size == 0 {
            return Err(DomainError::invalid_configuration(
                "sliding_window_size must be at least 1",
            ));
        }
        if self.minimum_number_of_calls == 0
            || self.minimum_number_of_calls > self.sliding_window_size
        {
            return Err(DomainError::invalid_configuration(format!(
                "minimum_number_of_calls must be in 1..={}, got {}",
                self.sliding_window_size, self.minimum_number_of_calls
            )));
        }
        if self.permitted_number_of_calls_in_half_open_state == 0 {
            return Err(DomainError::invalid_configuration(
                "permitted_number_of_calls_in_half_open_state must be at least 1",
            ));
        }
        Ok(())
    }
}
