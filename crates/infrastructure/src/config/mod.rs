//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `resilience`: circuit breaker thresholds and the time limiter
//! - `chaos`: initial fault-injection settings
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, then environment variables such as
//! `CHAOSGUARD_RESILIENCE__TIME_LIMITER__TIMEOUT_MS=1500`.

mod chaos;
mod resilience;

use std::path::Path;

use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use chaos::ChaosAppConfig;
pub use resilience::ResilienceAppConfig;

use crate::adapters::DownstreamConfig;
use crate::telemetry::TelemetryConfig;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "CHAOSGUARD";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Circuit breaker and time limiter
    #[serde(default)]
    pub resilience: ResilienceAppConfig,

    /// Fault injection at startup
    #[serde(default)]
    pub chaos: ChaosAppConfig,

    /// The simulated dependency
    #[serde(default)]
    pub downstream: DownstreamConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional `config.toml`
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(
            config::File::with_name("config").required(false),
            environment(),
        )
    }

    /// Load configuration from the given file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path.as_ref()).required(true), environment())
    }

    fn build<S>(file: S, env: config::Environment) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Check value ranges of every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resilience.circuit_breaker.validate()?;
        if self.resilience.time_limiter.timeout_ms == 0 {
            return Err(DomainError::invalid_configuration(
                "time_limiter.timeout_ms must be greater than zero",
            )
            .into());
        }
        self.chaos.to_injection_config()?;
        if self.downstream.service_name.trim().is_empty() {
            return Err(DomainError::invalid_configuration(
                "downstream.service_name must not be empty",
            )
            .into());
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
