//! Inclusive latency range for injected delays

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::DomainError;

/// Inclusive range of milliseconds an injected delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    min_ms: u64,
    max_ms: u64,
}

impl LatencyRange {
    /// Create a new range, rejecting `min_ms > max_ms`
    pub const fn new(min_ms: u64, max_ms: u64) -> Result<Self, DomainError> {
        if min_ms > max_ms {
            return Err(DomainError::InvalidLatencyRange { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    /// Lower bound in milliseconds
    #[must_use]
    pub const fn min_ms(&self) -> u64 {
        self.min_ms
    }

    /// Upper bound in milliseconds
    #[must_use]
    pub const fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Lower bound as a duration
    #[must_use]
    pub const fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    /// Upper bound as a duration
    #[must_use]
    pub const fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// Whether the range has no spread
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        self.min_ms == self.max_ms
    }
}

impl Default for LatencyRange {
    /// 3-5 seconds, the slow-dependency profile of the demo scenarios
    fn default() -> Self {
        Self {
            min_ms: 3_000,
            max_ms: 5_000,
        }
    }
}

impl fmt::Display for LatencyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}ms", self.min_ms, self.max_ms)
    }
}
