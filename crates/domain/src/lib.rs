//! Domain layer for ChaosGuard
//!
//! Contains the resilience vocabulary: call outcomes, the sliding outcome
//! window, the circuit breaker state machine, fault-injection settings and
//! the order/response entities exchanged with the downstream service.
//! This layer performs no I/O and never awaits.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
