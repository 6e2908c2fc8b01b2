//! System clock adapter - Implements ClockPort

use std::time::Instant;

use application::ports::ClockPort;

/// Monotonic clock backed by tokio's timer
///
/// Follows tokio's paused test clock, so breaker cool-downs advance together
/// with `tokio::time::advance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
