//! Telemetry infrastructure
//!
//! Installs the process-wide `tracing` subscriber: an `EnvFilter` plus a
//! console formatter, human-readable or JSON.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};
