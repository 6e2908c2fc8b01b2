//! Record of one protected call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::value_objects::CallOutcome;

/// Transient record of a single invocation
///
/// Built once the call settles, folded into the breaker and handed back to
/// the caller; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAttempt {
    /// Wall-clock start of the call
    pub started_at: DateTime<Utc>,
    /// How the call settled
    pub outcome: CallOutcome,
    /// Time from start until the outcome was known
    pub duration_ms: u64,
}

impl CallAttempt {
    /// Create an attempt from its start and measured duration
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(started_at: DateTime<Utc>, outcome: CallOutcome, duration: Duration) -> Self {
        Self {
            started_at,
            outcome,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Measured duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_millisecond_duration() {
        let attempt = CallAttempt::new(
            Utc::now(),
            CallOutcome::Timeout,
            Duration::from_micros(2_000_900),
        );
        assert_eq!(attempt.duration_ms, 2000);
        assert_eq!(attempt.duration(), Duration::from_secs(2));
    }
}
