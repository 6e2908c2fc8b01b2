//! Breaker, time limit and fallback composed around one call
//!
//! Order of effects for every call:
//!
//! 1. the named breaker is asked for a permit; a rejection goes straight to
//!    the fallback and the task is never started
//! 2. the task runs under the time limiter
//! 3. the outcome is recorded into the breaker
//! 4. on anything but success the fallback produces the result
//!
//! Recording happens before the fallback runs, so a burst of timeouts trips
//! the breaker for the calls that follow within the same burst.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain::{CallAttempt, CallOutcome, FallbackReason};
use tracing::{debug, info};

use super::circuit_breaker::CircuitBreakerRegistry;
use super::fallback::FallbackChain;
use super::time_limiter::{TimeLimiter, TimeLimiterError};
use crate::error::ResilienceError;

/// Result of an executed call with its bookkeeping
#[derive(Debug, Clone)]
pub struct Execution<T> {
    /// The task's value or the fallback's substitute
    pub value: T,
    /// The attempt, absent when the breaker rejected the call
    pub attempt: Option<CallAttempt>,
    /// Why the fallback was used, absent on success
    pub fallback_reason: Option<FallbackReason>,
}

/// Runs calls under a named circuit breaker and a time limit
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    breakers: Arc<CircuitBreakerRegistry>,
    time_limiter: TimeLimiter,
}

impl ResilientExecutor {
    /// Create an executor
    #[must_use]
    pub fn new(breakers: Arc<CircuitBreakerRegistry>, time_limiter: TimeLimiter) -> Self {
        Self {
            breakers,
            time_limiter,
        }
    }

    /// Breakers used by this executor
    #[must_use]
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Time limiter used by this executor
    #[must_use]
    pub const fn time_limiter(&self) -> &TimeLimiter {
        &self.time_limiter
    }

    /// Run `task` and return its value or the fallback's
    ///
    /// Never fails: every path ends in a value.
    pub async fn execute<F, Fut, T, E>(
        &self,
        name: &str,
        timeout: Duration,
        task: F,
        fallback: &FallbackChain<T>,
    ) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
    {
        self.execute_with_attempt(name, timeout, task, fallback)
            .await
            .value
    }

    /// Like [`execute`](Self::execute), also reporting what happened
    pub async fn execute_with_attempt<F, Fut, T, E>(
        &self,
        name: &str,
        timeout: Duration,
        task: F,
        fallback: &FallbackChain<T>,
    ) -> Execution<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
    {
        let (result, attempt) = self.run(name, timeout, task).await;

        match result {
            Ok(value) => Execution {
                value,
                attempt,
                fallback_reason: None,
            },
            Err(error) => {
                let reason = error.reason();
                info!(
                    circuit = %name,
                    reason = %reason,
                    error = %error,
                    "Using fallback"
                );
                Execution {
                    value: fallback.fallback(&error),
                    attempt,
                    fallback_reason: Some(reason),
                }
            },
        }
    }

    async fn run<F, Fut, T, E>(
        &self,
        name: &str,
        timeout: Duration,
        task: F,
    ) -> (Result<T, ResilienceError>, Option<CallAttempt>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
    {
        let breaker = self.breakers.breaker(name);
        let permit = match breaker.try_acquire() {
            Ok(permit) => permit,
            Err(rejected) => return (Err(rejected.into()), None),
        };

        let started_at = Utc::now();
        let start = tokio::time::Instant::now();
        let result = self.time_limiter.run_with_timeout(timeout, task).await;
        let elapsed = start.elapsed();

        let (outcome, result) = match result {
            Ok(value) => (CallOutcome::Success, Ok(value)),
            Err(TimeLimiterError::Elapsed(e)) => (CallOutcome::Timeout, Err(e.into())),
            Err(TimeLimiterError::Failed(e)) => {
                (CallOutcome::Failure, Err(ResilienceError::downstream(e)))
            },
            Err(TimeLimiterError::Panicked(message)) => (
                CallOutcome::Failure,
                Err(ResilienceError::downstream_message(format!(
                    "task panicked: {message}"
                ))),
            ),
        };

        permit.record(outcome);
        debug!(
            circuit = %name,
            outcome = %outcome,
            elapsed_ms = elapsed.as_millis(),
            "Protected call finished"
        );

        (result, Some(CallAttempt::new(started_at, outcome, elapsed)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use domain::{CircuitBreakerConfig, CircuitState};

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::ClockPort;
    use crate::services::test_support::TokioClock;
    use crate::services::time_limiter::TimeLimiterConfig;

    const NAME: &str = "externalService";
    const TIMEOUT: Duration = Duration::from_secs(2);

    fn executor() -> ResilientExecutor {
        let clock: Arc<dyn ClockPort> = Arc::new(TokioClock);
        let config = CircuitBreakerConfig::custom(50.0, 4, 10, Duration::from_secs(10), 1);
        ResilientExecutor::new(
            Arc::new(CircuitBreakerRegistry::new(config, clock)),
            TimeLimiter::new(TimeLimiterConfig::default()),
        )
    }

    fn reasons() -> FallbackChain<Option<FallbackReason>> {
        FallbackChain::new(|e| Some(e.reason()))
    }

    async fn slow(delay: Duration) -> Result<Option<FallbackReason>, ApplicationError> {
        tokio::time::sleep(delay).await;
        Ok(None)
    }

    async fn failing() -> Result<Option<FallbackReason>, ApplicationError> {
        Err(ApplicationError::ExternalService("Simulated failure".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn success_returns_value_without_fallback() {
        let executor = executor();
        let execution = executor
            .execute_with_attempt(NAME, TIMEOUT, || slow(Duration::from_millis(200)), &reasons())
            .await;

        assert_eq!(execution.fallback_reason, None);
        assert_eq!(execution.value, None);
        let attempt = execution.attempt.unwrap();
        assert_eq!(attempt.outcome, CallOutcome::Success);
        assert_eq!(attempt.duration_ms, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_uses_fallback_within_limit() {
        let executor = executor();
        let start = tokio::time::Instant::now();

        let value = executor
            .execute(NAME, TIMEOUT, || slow(Duration::from_secs(4)), &reasons())
            .await;

        assert_eq!(value, Some(FallbackReason::Timeout));
        assert_eq!(start.elapsed(), TIMEOUT);
        assert_eq!(executor.breakers().breaker(NAME).metrics().failed_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_uses_fallback_with_original_message() {
        let executor = executor();
        let chain = FallbackChain::new(|e: &ResilienceError| {
            e.original_message().map(ToString::to_string)
        });

        let value = executor
            .execute(
                NAME,
                TIMEOUT,
                || async { Err::<Option<String>, _>(ApplicationError::ExternalService("boom".to_string())) },
                &chain,
            )
            .await;

        assert_eq!(value.as_deref(), Some("External service error: boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_timeouts_opens_breaker_for_next_call() {
        let executor = executor();
        for _ in 0..4 {
            let value = executor
                .execute(NAME, TIMEOUT, || slow(Duration::from_secs(4)), &reasons())
                .await;
            assert_eq!(value, Some(FallbackReason::Timeout));
        }
        assert_eq!(executor.breakers().state(NAME), CircuitState::Open);

        let started = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&started);
        let execution = executor
            .execute_with_attempt(
                NAME,
                TIMEOUT,
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    slow(Duration::ZERO)
                },
                &reasons(),
            )
            .await;

        assert_eq!(execution.value, Some(FallbackReason::CircuitOpen));
        assert!(execution.attempt.is_none());
        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_after_cool_down_closes_breaker() {
        let executor = executor();
        for _ in 0..4 {
            executor.execute(NAME, TIMEOUT, failing, &reasons()).await;
        }
        assert_eq!(executor.breakers().state(NAME), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(10)).await;
        let value = executor
            .execute(NAME, TIMEOUT, || slow(Duration::from_millis(10)), &reasons())
            .await;

        assert_eq!(value, None);
        assert_eq!(executor.breakers().state(NAME), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_reports_reason_and_attempt() {
        let executor = executor();
        let execution = executor
            .execute_with_attempt(NAME, TIMEOUT, failing, &reasons())
            .await;

        assert_eq!(execution.fallback_reason, Some(FallbackReason::Failure));
        assert_eq!(execution.attempt.unwrap().outcome, CallOutcome::Failure);
    }

    #[tokio::test]
    async fn panicking_task_counts_as_failure() {
        let executor = executor();
        let value = executor
            .execute(
                NAME,
                TIMEOUT,
                || async {
                    if true {
                        panic!("kaboom");
                    }
                    Ok::<Option<FallbackReason>, ApplicationError>(None)
                },
                &reasons(),
            )
            .await;

        assert_eq!(value, Some(FallbackReason::Failure));
        assert_eq!(executor.breakers().breaker(NAME).metrics().failed_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn breakers_are_scoped_by_name() {
        let executor = executor();
        for _ in 0..4 {
            executor.execute("a", TIMEOUT, failing, &reasons()).await;
        }

        let value = executor
            .execute("b", TIMEOUT, || slow(Duration::ZERO), &reasons())
            .await;
        assert_eq!(value, None);
        assert_eq!(executor.breakers().state("a"), CircuitState::Open);
        assert_eq!(executor.breakers().state("b"), CircuitState::Closed);
    }
}
