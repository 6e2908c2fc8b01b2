//! Application services - Resilience orchestration and use cases

mod circuit_breaker;
mod demo_service;
mod fallback;
mod injection_settings;
mod order_service;
mod resilience_context;
mod resilient_executor;
#[cfg(test)]
mod test_support;
mod time_limiter;

pub use circuit_breaker::{
    CallPermit, CircuitBreaker, CircuitBreakerMetrics, CircuitBreakerRegistry,
};
pub use demo_service::{DemoService, DemoStatus};
pub use fallback::FallbackChain;
pub use injection_settings::InjectionSettings;
pub use order_service::OrderService;
pub use resilience_context::ResilienceContext;
pub use resilient_executor::{Execution, ResilientExecutor};
pub use time_limiter::{TimeLimiter, TimeLimiterConfig, TimeLimiterError};
