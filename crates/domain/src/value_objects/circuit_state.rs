//! Circuit state name

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the state a circuit breaker is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Dependency assumed down, calls fail fast
    Open,
    /// Probing whether the dependency has recovered
    HalfOpen,
}

impl CircuitState {
    /// Upper-case name as reported by status queries
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_upper_case_names() {
        assert_eq!(CircuitState::Closed.to_string(), "CLOSED");
        assert_eq!(CircuitState::Open.to_string(), "OPEN");
        assert_eq!(CircuitState::HalfOpen.to_string(), "HALF_OPEN");
    }

    #[test]
    fn serde_matches_display() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"HALF_OPEN\"");
    }
}
