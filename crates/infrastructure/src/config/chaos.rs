//! Chaos configuration: initial fault-injection settings

use domain::{DomainError, InjectionConfig, LatencyRange};
use serde::{Deserialize, Serialize};

/// Fault injection at startup; changed at runtime through the
/// administrative surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosAppConfig {
    /// Master switch
    #[serde(default)]
    pub enabled: bool,

    /// Delay each downstream call
    #[serde(default)]
    pub latency_active: bool,

    /// Lower bound of the injected delay in milliseconds
    #[serde(default = "default_latency_range_start_ms")]
    pub latency_range_start_ms: u64,

    /// Upper bound of the injected delay in milliseconds
    #[serde(default = "default_latency_range_end_ms")]
    pub latency_range_end_ms: u64,

    /// Fail each downstream call
    #[serde(default)]
    pub failure_active: bool,
}

const fn default_latency_range_start_ms() -> u64 {
    3_000
}

const fn default_latency_range_end_ms() -> u64 {
    5_000
}

impl Default for ChaosAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            latency_active: false,
            latency_range_start_ms: default_latency_range_start_ms(),
            latency_range_end_ms: default_latency_range_end_ms(),
            failure_active: false,
        }
    }
}

impl ChaosAppConfig {
    /// Injection settings described by this section
    pub fn to_injection_config(&self) -> Result<InjectionConfig, DomainError> {
        Ok(InjectionConfig {
            enabled: self.enabled,
            latency_active: self.latency_active,
            latency_range: LatencyRange::new(
                self.latency_range_start_ms,
                self.latency_range_end_ms,
            )?,
            failure_active: self.failure_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled_with_demo_range() {
        let injection = ChaosAppConfig::default().to_injection_config().unwrap();
        assert_eq!(injection, InjectionConfig::disabled());
        assert_eq!(injection.latency_range, LatencyRange::default());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = ChaosAppConfig {
            latency_range_start_ms: 5_000,
            latency_range_end_ms: 3_000,
            ..ChaosAppConfig::default()
        };
        assert!(matches!(
            config.to_injection_config(),
            Err(DomainError::InvalidLatencyRange {
                min_ms: 5_000,
                max_ms: 3_000
            })
        ));
    }

    #[test]
    fn flags_are_carried_over() {
        let config = ChaosAppConfig {
            enabled: true,
            latency_active: true,
            failure_active: true,
            ..ChaosAppConfig::default()
        };
        let injection = config.to_injection_config().unwrap();
        assert!(injection.injects_latency());
        assert!(injection.injects_failure());
    }
}
