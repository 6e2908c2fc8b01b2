//! Tracing subscriber initialization and configuration

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "application=debug,infrastructure=info")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit one JSON object per event instead of human-readable lines
    #[serde(default)]
    pub json: bool,

    /// Include source file and line number in each event
    #[serde(default)]
    pub with_file: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
            with_file: false,
        }
    }
}

impl TelemetryConfig {
    /// Same settings with a different filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_filter)
                .map_err(|e| TelemetryError::Filter(format!("{}: {e}", self.log_filter))),
        }
    }
}

/// Initialize logging with the given configuration
///
/// Can succeed only once per process; later calls return
/// [`TelemetryError::Init`].
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.with_file)
                    .with_line_number(config.with_file),
            )
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(
        filter = %config.log_filter,
        json = config.json,
        "Telemetry initialized"
    );
    Ok(())
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),

    /// The log filter could not be parsed
    #[error("Invalid log filter: {0}")]
    Filter(String),
}
