//! Upper bound on how long a protected call may run

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::error::{ApplicationError, TimeoutError};

/// Time limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimiterConfig {
    /// Maximum duration of a call in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Abort the underlying task when the limit is hit
    ///
    /// When false the task is detached and left to finish on its own; its
    /// result is dropped.
    #[serde(default = "default_cancel_running_task")]
    pub cancel_running_task: bool,
}

const fn default_timeout_ms() -> u64 {
    2_000
}

const fn default_cancel_running_task() -> bool {
    true
}

impl Default for TimeLimiterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            cancel_running_task: default_cancel_running_task(),
        }
    }
}

impl TimeLimiterConfig {
    /// Limit as a duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.timeout_ms == 0 {
            return Err(ApplicationError::Configuration(
                "time_limiter.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a limited call produced no value
#[derive(Debug)]
pub enum TimeLimiterError<E> {
    /// The limit elapsed first
    Elapsed(TimeoutError),
    /// The call completed with its own error
    Failed(E),
    /// The task running the call panicked
    Panicked(String),
}

/// Runs futures on their own task with a deadline
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeLimiter {
    config: TimeLimiterConfig,
}

impl TimeLimiter {
    /// Create a limiter
    #[must_use]
    pub const fn new(config: TimeLimiterConfig) -> Self {
        Self { config }
    }

    /// Default limit
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Run `task` with an explicit limit
    ///
    /// The future is spawned so that it can keep running detached when
    /// `cancel_running_task` is off. When it is on, the task is aborted on
    /// expiry and also when the returned future is dropped first.
    pub async fn run_with_timeout<F, Fut, T, E>(
        &self,
        timeout: Duration,
        task: F,
    ) -> Result<T, TimeLimiterError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let mut task = SpawnedTask {
            handle: tokio::spawn(task()),
            abort_on_drop: self.config.cancel_running_task,
        };

        match tokio::time::timeout(timeout, &mut task.handle).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => Err(TimeLimiterError::Failed(e)),
            Ok(Err(join_error)) => Err(TimeLimiterError::Panicked(panic_message(join_error))),
            Err(_) => {
                if task.abort_on_drop {
                    task.handle.abort();
                    task.abort_on_drop = false;
                    debug!(timeout_ms = timeout.as_millis(), "Aborted task after timeout");
                } else {
                    debug!(
                        timeout_ms = timeout.as_millis(),
                        "Timed-out task left running detached"
                    );
                }
                warn!(timeout_ms = timeout.as_millis(), "Call timed out");
                Err(TimeLimiterError::Elapsed(TimeoutError { timeout }))
            },
        }
    }
}

/// Handle of a spawned call; aborts the task on drop unless detached
struct SpawnedTask<T> {
    handle: JoinHandle<T>,
    abort_on_drop: bool,
}

impl<T> Drop for SpawnedTask<T> {
    fn drop(&mut self) {
        if self.abort_on_drop && !self.handle.is_finished() {
            self.handle.abort();
            debug!("Aborted task whose caller went away");
        }
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    fn limiter(timeout_ms: u64, cancel_running_task: bool) -> TimeLimiter {
        TimeLimiter::new(TimeLimiterConfig {
            timeout_ms,
            cancel_running_task,
        })
    }

    #[test]
    fn config_defaults() {
        let config = TimeLimiterConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert!(config.cancel_running_task);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = TimeLimiterConfig {
            timeout_ms: 0,
            cancel_running_task: true,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: TimeLimiterConfig = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(config.timeout_ms, 500);
        assert!(config.cancel_running_task);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_call_returns_value() {
        let result = limiter(2_000, true)
            .run_with_timeout(Duration::from_millis(2_000), || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, String>(42)
            })
            .await;

        assert!(matches!(result, Ok(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn call_error_is_passed_through() {
        let result = limiter(2_000, true)
            .run_with_timeout(Duration::from_millis(2_000), || async {
                Err::<(), _>("boom".to_string())
            })
            .await;

        assert!(matches!(result, Err(TimeLimiterError::Failed(e)) if e == "boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out_at_limit() {
        let start = tokio::time::Instant::now();
        let result = limiter(2_000, true)
            .run_with_timeout(Duration::from_millis(2_000), || async {
                tokio::time::sleep(Duration::from_secs(4)).await;
                Ok::<_, String>(())
            })
            .await;

        assert!(matches!(
            result,
            Err(TimeLimiterError::Elapsed(TimeoutError { timeout })) if timeout == Duration::from_secs(2)
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_completes() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = limiter(100, true)
            .run_with_timeout(Duration::from_millis(100), move || async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await;
        assert!(matches!(result, Err(TimeLimiterError::Elapsed(_))));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_caller_aborts_task() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let limiter = limiter(2_000, true);

        let outer = tokio::time::timeout(
            Duration::from_millis(100),
            limiter.run_with_timeout(limiter.timeout(), move || async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            }),
        )
        .await;
        assert!(outer.is_err());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_caller_leaves_detached_task_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let limiter = limiter(2_000, false);

        let outer = tokio::time::timeout(
            Duration::from_millis(100),
            limiter.run_with_timeout(limiter.timeout(), move || async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            }),
        )
        .await;
        assert!(outer.is_err());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn detached_task_runs_to_completion() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = limiter(100, false)
            .run_with_timeout(Duration::from_millis(100), move || async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await;
        assert!(matches!(result, Err(TimeLimiterError::Elapsed(_))));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panic_is_reported() {
        let result = limiter(1_000, true)
            .run_with_timeout(Duration::from_millis(1_000), || async {
                if true {
                    panic!("exploded");
                }
                Ok::<(), String>(())
            })
            .await;

        assert!(matches!(result, Err(TimeLimiterError::Panicked(msg)) if msg == "exploded"));
    }
}
