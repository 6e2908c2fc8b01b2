//! Clock port
//!
//! Breakers read time through this port so cool-downs can be driven by a
//! paused or manual clock in tests.

use std::time::Instant;

#[cfg(test)]
use mockall::automock;

/// Monotonic time source
#[cfg_attr(test, automock)]
pub trait ClockPort: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}
