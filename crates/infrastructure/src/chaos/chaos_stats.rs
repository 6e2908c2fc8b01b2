//! Counters kept by the fault injector

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Statistics about fault injection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStats {
    /// Total number of calls seen by the injector
    pub total_calls: u64,
    /// Calls delayed by injected latency
    pub latency_injected: u64,
    /// Total latency added (milliseconds)
    pub total_latency_added_ms: u64,
    /// Calls failed by injection
    pub failures_injected: u64,
    /// Calls that reached the downstream
    pub passed_through: u64,
}

/// Lock-free counters, safe to bump from tasks that outlived their caller
#[derive(Debug, Default)]
pub(crate) struct ChaosCounters {
    total_calls: AtomicU64,
    latency_injected: AtomicU64,
    total_latency_added_ms: AtomicU64,
    failures_injected: AtomicU64,
    passed_through: AtomicU64,
}

impl ChaosCounters {
    pub(crate) fn record_call(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn record_latency(&self, delay: Duration) {
        self.latency_injected.fetch_add(1, Ordering::Relaxed);
        self.total_latency_added_ms
            .fetch_add(delay.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures_injected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pass_through(&self) {
        self.passed_through.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ChaosStats {
        ChaosStats {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            latency_injected: self.latency_injected.load(Ordering::Relaxed),
            total_latency_added_ms: self.total_latency_added_ms.load(Ordering::Relaxed),
            failures_injected: self.failures_injected.load(Ordering::Relaxed),
            passed_through: self.passed_through.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.total_calls.store(0, Ordering::Relaxed);
        self.latency_injected.store(0, Ordering::Relaxed);
        self.total_latency_added_ms.store(0, Ordering::Relaxed);
        self.failures_injected.store(0, Ordering::Relaxed);
        self.passed_through.store(0, Ordering::Relaxed);
    }
}
