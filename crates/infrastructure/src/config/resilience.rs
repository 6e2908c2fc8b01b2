//! Resilience configuration: circuit breaker and time limiter

use application::TimeLimiterConfig;
use domain::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};

/// Settings of the protected call path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResilienceAppConfig {
    /// Breaker thresholds, shared by every named breaker
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    /// Time limit of protected calls
    #[serde(default)]
    pub time_limiter: TimeLimiterConfig,
}
