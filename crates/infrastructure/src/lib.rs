//! Infrastructure layer - Adapters and ambient concerns
//!
//! Implements ports defined in the application layer.
//! Contains the fault injector, the simulated downstream service, the
//! system clock, configuration loading and logging setup.

pub mod adapters;
pub mod chaos;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use chaos::{ChaosStats, FaultInjector, InjectedError};
pub use config::{AppConfig, ChaosAppConfig, ConfigError, ResilienceAppConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
