//! Count-based sliding window of call outcomes

use std::collections::VecDeque;

use crate::value_objects::CallOutcome;

/// Fixed-capacity history of the most recent call outcomes
///
/// Appending to a full window evicts the oldest outcome. The failure count
/// is maintained incrementally so the rate is O(1) to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindow {
    capacity: usize,
    outcomes: VecDeque<CallOutcome>,
    failures: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` outcomes
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
            failures: 0,
        }
    }

    /// Append an outcome, evicting the oldest when full
    pub fn record(&mut self, outcome: CallOutcome) {
        if self.outcomes.len() == self.capacity {
            if let Some(evicted) = self.outcomes.pop_front() {
                if evicted.is_failure() {
                    self.failures -= 1;
                }
            }
        }
        if outcome.is_failure() {
            self.failures += 1;
        }
        self.outcomes.push_back(outcome);
    }

    /// Drop every recorded outcome
    pub fn clear(&mut self) {
        self.outcomes.clear();
        self.failures = 0;
    }

    /// Maximum number of outcomes kept
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of outcomes currently recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no outcome is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of `Failure` and `Timeout` outcomes recorded
    #[must_use]
    pub const fn failure_count(&self) -> usize {
        self.failures
    }

    /// Failure rate in percent; 0.0 for an empty window
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.failures as f64 * 100.0 / self.outcomes.len() as f64
        }
    }

    /// Outcomes from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &CallOutcome> {
        self.outcomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_has_zero_rate() {
        let window = SlidingWindow::new(4);
        assert!(window.is_empty());
        assert!(window.failure_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut window = SlidingWindow::new(0);
        window.record(CallOutcome::Failure);
        window.record(CallOutcome::Success);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
        assert_eq!(window.failure_count(), 0);
    }

    #[test]
    fn timeouts_count_as_failures() {
        let mut window = SlidingWindow::new(4);
        window.record(CallOutcome::Timeout);
        window.record(CallOutcome::Success);
        assert!((window.failure_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = SlidingWindow::new(3);
        window.record(CallOutcome::Failure);
        window.record(CallOutcome::Success);
        window.record(CallOutcome::Success);
        window.record(CallOutcome::Success);

        assert_eq!(window.len(), 3);
        assert_eq!(window.failure_count(), 0);
        assert!(window.iter().all(|o| *o == CallOutcome::Success));
    }

    #[test]
    fn clear_resets_counts() {
        let mut window = SlidingWindow::new(3);
        window.record(CallOutcome::Failure);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.failure_count(), 0);
    }
}
