//! Why a fallback response was produced

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cause that routed a call to the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    /// The breaker rejected the call without invoking the dependency
    CircuitOpen,
    /// The call exceeded its time limit
    Timeout,
    /// The dependency returned its own error
    Failure,
}

impl FallbackReason {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CircuitOpen => "Circuit Breaker Open",
            Self::Timeout => "Timeout",
            Self::Failure => "Downstream Failure",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
