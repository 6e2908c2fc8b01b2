//! Value Objects - Immutable, identity-less domain primitives

mod call_outcome;
mod circuit_breaker_config;
mod circuit_state;
mod demo_scenario;
mod fallback_reason;
mod injection_config;
mod latency_range;

pub use call_outcome::CallOutcome;
pub use circuit_breaker_config::CircuitBreakerConfig;
pub use circuit_state::CircuitState;
pub use demo_scenario::DemoScenario;
pub use fallback_reason::FallbackReason;
pub use injection_config::InjectionConfig;
pub use latency_range::LatencyRange;
