//! Application layer - Resilience orchestration
//!
//! Wraps calls to an unstable dependency in a circuit breaker, a time
//! limiter and a fallback chain, and exposes the administrative surface
//! (breaker state, breaker reset, fault-injection settings) through an
//! explicit [`ResilienceContext`].

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, CircuitOpenError, ResilienceError, TimeoutError};
pub use ports::*;
pub use services::*;
