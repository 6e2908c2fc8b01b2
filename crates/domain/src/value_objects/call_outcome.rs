//! Outcome of a single protected call

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result classification of one call attempt
///
/// Both `Failure` and `Timeout` count against the breaker's failure rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOutcome {
    /// The call completed and returned a value
    Success,
    /// The call completed with its own error
    Failure,
    /// The call did not complete within its time limit
    Timeout,
}

impl CallOutcome {
    /// Whether this outcome counts as a failed call
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failure | Self::Timeout)
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}
