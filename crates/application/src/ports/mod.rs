//! Ports - Interfaces to the outside world
//!
//! The resilience core consumes only a clock and the downstream call it
//! protects.

mod clock_port;
mod external_service_port;

pub use clock_port::ClockPort;
pub use external_service_port::ExternalServicePort;

#[cfg(test)]
pub use clock_port::MockClockPort;
#[cfg(test)]
pub use external_service_port::MockExternalServicePort;
