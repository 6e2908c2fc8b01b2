//! Shared helpers for service tests

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::ports::ClockPort;

/// Clock that only moves when told to
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Clock driven by tokio's (possibly paused) timer
#[derive(Debug, Default)]
pub(crate) struct TokioClock;

impl ClockPort for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
