//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod simulated_external_service;
mod system_clock;

pub use simulated_external_service::{DownstreamConfig, SimulatedExternalService};
pub use system_clock::SystemClock;
