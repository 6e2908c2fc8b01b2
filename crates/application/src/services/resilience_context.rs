//! The resilience core's single entry point
//!
//! Holds the breaker registry, the executor and the live injection settings.
//! Built once at startup and shared by `Arc`; there is no global state.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{CircuitBreakerConfig, CircuitState, InjectionConfig};
use tracing::info;

use super::circuit_breaker::{CircuitBreakerMetrics, CircuitBreakerRegistry};
use super::fallback::FallbackChain;
use super::injection_settings::InjectionSettings;
use super::resilient_executor::ResilientExecutor;
use super::time_limiter::{TimeLimiter, TimeLimiterConfig};
use crate::ports::ClockPort;

/// Executor plus administrative operations
#[derive(Debug, Clone)]
pub struct ResilienceContext {
    executor: ResilientExecutor,
    injection: InjectionSettings,
}

impl ResilienceContext {
    /// Assemble a context from its parts
    #[must_use]
    pub fn new(executor: ResilientExecutor, injection: InjectionSettings) -> Self {
        Self {
            executor,
            injection,
        }
    }

    /// Assemble a context from configuration
    #[must_use]
    pub fn from_config(
        breaker_config: CircuitBreakerConfig,
        time_limiter_config: TimeLimiterConfig,
        injection: InjectionSettings,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let breakers = Arc::new(CircuitBreakerRegistry::new(breaker_config, clock));
        let executor = ResilientExecutor::new(breakers, TimeLimiter::new(time_limiter_config));
        Self::new(executor, injection)
    }

    /// Default call time limit
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.executor.time_limiter().timeout()
    }

    /// Run `task` under breaker `name` with `timeout`, falling back on error
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
        self.executor.execute(name, timeout, task, fallback).await
    }

    /// State of breaker `name`; read-only
    #[must_use]
    pub fn breaker_state(&self, name: &str) -> CircuitState {
        self.executor.breakers().state(name)
    }

    /// Counters of breaker `name`; read-only, idle for unknown names
    #[must_use]
    pub fn breaker_metrics(&self, name: &str) -> CircuitBreakerMetrics {
        self.executor.breakers().metrics(name)
    }

    /// Force breaker `name` closed; idempotent
    pub fn reset_breaker(&self, name: &str) {
        info!(
            circuit = %name,
            previous = %self.breaker_state(name),
            "Resetting circuit breaker"
        );
        self.executor.breakers().reset(name);
    }

    /// Replace the fault-injection settings, effective from the next call
    pub fn set_injection_config(&self, config: InjectionConfig) {
        self.injection.set(config);
    }

    /// Current fault-injection settings
    #[must_use]
    pub fn injection_config(&self) -> InjectionConfig {
        self.injection.current()
    }
}
