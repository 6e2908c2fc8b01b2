//! Fault injector for the downstream call
//!
//! Settings are read once per call, so a change made while a call is
//! sleeping applies to the next call only. The injected delay is a plain
//! `tokio::time::sleep`, which ends as soon as the surrounding task is
//! aborted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, InjectionSettings};
use domain::LatencyRange;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use super::chaos_stats::{ChaosCounters, ChaosStats};

/// Error types that can be injected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectedError {
    /// Synthetic downstream failure
    #[error("Injected failure: simulated downstream outage")]
    SimulatedFailure,
}

impl From<InjectedError> for ApplicationError {
    fn from(err: InjectedError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Draw a delay uniformly from `range`, both ends inclusive
pub fn sample_latency(range: LatencyRange) -> Duration {
    if range.is_constant() {
        return range.min();
    }
    Duration::from_millis(rand::rng().random_range(range.min_ms()..=range.max_ms()))
}

/// Fault injector for simulating an unstable dependency
#[derive(Debug, Clone)]
pub struct FaultInjector {
    settings: InjectionSettings,
    counters: Arc<ChaosCounters>,
}

impl FaultInjector {
    /// Create an injector reading the given live settings
    pub fn new(settings: InjectionSettings) -> Self {
        Self {
            settings,
            counters: Arc::new(ChaosCounters::default()),
        }
    }

    /// Run `downstream` with the current faults applied
    ///
    /// - disabled: `downstream` runs immediately and its result is returned
    ///   unchanged
    /// - latency active: a delay from the configured range is awaited first
    /// - failure active: [`InjectedError`] is returned and `downstream` is
    ///   never started
    pub async fn invoke<F, Fut, T, E>(&self, downstream: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<InjectedError>,
    {
        let config = self.settings.current();
        self.counters.record_call();

        if config.injects_latency() {
            let delay = sample_latency(config.latency_range);
            self.counters.record_latency(delay);
            debug!(delay_ms = delay.as_millis(), "Injecting latency");
            tokio::time::sleep(delay).await;
        }

        if config.injects_failure() {
            self.counters.record_failure();
            warn!("Injecting failure");
            return Err(InjectedError::SimulatedFailure.into());
        }

        self.counters.record_pass_through();
        downstream().await
    }

    /// Get current statistics
    pub fn stats(&self) -> ChaosStats {
        self.counters.snapshot()
    }

    /// Reset the statistics
    pub fn reset_stats(&self) {
        self.counters.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use domain::InjectionConfig;

    use super::*;

    fn range(min_ms: u64, max_ms: u64) -> LatencyRange {
        LatencyRange::new(min_ms, max_ms).unwrap()
    }

    async fn downstream() -> Result<u32, ApplicationError> {
        Ok(42)
    }

    #[test]
    fn sample_stays_within_range() {
        let r = range(3_000, 5_000);
        for _ in 0..200 {
            let delay = sample_latency(r);
            assert!(delay >= Duration::from_millis(3_000));
            assert!(delay <= Duration::from_millis(5_000));
        }
    }

    #[test]
    fn sample_of_point_range_is_exact() {
        assert_eq!(sample_latency(range(250, 250)), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_injector_passes_through() {
        let injector = FaultInjector::new(InjectionSettings::default());
        let start = tokio::time::Instant::now();

        assert_eq!(injector.invoke(downstream).await.unwrap(), 42);
        assert_eq!(start.elapsed(), Duration::ZERO);

        let stats = injector.stats();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.passed_through, 1);
        assert_eq!(stats.latency_injected, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sub_switches_need_master_switch() {
        let injector = FaultInjector::new(InjectionSettings::new(InjectionConfig {
            enabled: false,
            latency_active: true,
            latency_range: range(3_000, 5_000),
            failure_active: true,
        }));

        assert!(injector.invoke(downstream).await.is_ok());
        assert_eq!(injector.stats().failures_injected, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_then_calls_downstream() {
        let injector = FaultInjector::new(InjectionSettings::new(InjectionConfig::latency(
            range(3_000, 5_000),
        )));
        let start = tokio::time::Instant::now();

        assert_eq!(injector.invoke(downstream).await.unwrap(), 42);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3_000));
        assert!(elapsed <= Duration::from_millis(5_000));

        let stats = injector.stats();
        assert_eq!(stats.latency_injected, 1);
        assert_eq!(u128::from(stats.total_latency_added_ms), elapsed.as_millis());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_skips_downstream() {
        let injector = FaultInjector::new(InjectionSettings::new(InjectionConfig::failures()));
        let called = AtomicBool::new(false);

        let result = injector
            .invoke(|| async {
                called.store(true, Ordering::SeqCst);
                Ok::<_, ApplicationError>(())
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::ExternalService(_))));
        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(injector.stats().failures_injected, 1);
        assert_eq!(injector.stats().passed_through, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_and_failure_sleeps_before_failing() {
        let injector = FaultInjector::new(InjectionSettings::new(
            InjectionConfig::latency_and_failures(range(1_000, 1_000)),
        ));
        let start = tokio::time::Instant::now();

        let result = injector.invoke(downstream).await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn downstream_errors_are_not_swallowed() {
        let injector = FaultInjector::new(InjectionSettings::default());
        let result = injector
            .invoke(|| async { Err::<(), _>(ApplicationError::Internal("own error".into())) })
            .await;

        assert!(matches!(result, Err(ApplicationError::Internal(msg)) if msg == "own error"));
    }

    #[tokio::test(start_paused = true)]
    async fn settings_change_applies_to_next_call() {
        let settings = InjectionSettings::default();
        let injector = FaultInjector::new(settings.clone());
        assert!(injector.invoke(downstream).await.is_ok());

        settings.set(InjectionConfig::failures());
        assert!(injector.invoke(downstream).await.is_err());

        injector.reset_stats();
        assert_eq!(injector.stats(), ChaosStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_call_stops_sleeping() {
        let injector = FaultInjector::new(InjectionSettings::new(InjectionConfig::latency(
            range(3_000, 3_000),
        )));
        let reached = Arc::new(AtomicBool::new(false));

        let task_injector = injector.clone();
        let flag = Arc::clone(&reached);
        let handle = tokio::spawn(async move {
            task_injector
                .invoke(|| async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok::<_, ApplicationError>(())
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(!reached.load(Ordering::SeqCst));
        assert_eq!(injector.stats().passed_through, 0);
    }
}
