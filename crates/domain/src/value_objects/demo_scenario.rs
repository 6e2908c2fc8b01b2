//! Demo scenario presets

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InjectionConfig, LatencyRange};
use crate::errors::DomainError;

/// The four stages of the chaos demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoScenario {
    /// Injection disabled, calls complete at baseline latency
    Normal,
    /// 3-5 second latency injected into every call
    ChaosLatency,
    /// Latency plus a synthetic failure on every call
    ChaosWithFailures,
    /// Latency injected, breaker reset, callers use the protected path
    ManagedChaos,
}

impl DemoScenario {
    /// All scenarios in presentation order
    pub const ALL: [Self; 4] = [
        Self::Normal,
        Self::ChaosLatency,
        Self::ChaosWithFailures,
        Self::ManagedChaos,
    ];

    /// Scenario number as used by the demo control surface
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::ChaosLatency => 2,
            Self::ChaosWithFailures => 3,
            Self::ManagedChaos => 4,
        }
    }

    /// Short label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::ChaosLatency => "Chaos Latency",
            Self::ChaosWithFailures => "Chaos + Failures",
            Self::ManagedChaos => "Managed Chaos",
        }
    }

    /// Injection settings applied when the scenario starts
    #[must_use]
    pub fn injection_config(&self) -> InjectionConfig {
        match self {
            Self::Normal => InjectionConfig::disabled(),
            Self::ChaosLatency | Self::ManagedChaos => {
                InjectionConfig::latency(LatencyRange::default())
            },
            Self::ChaosWithFailures => {
                InjectionConfig::latency_and_failures(LatencyRange::default())
            },
        }
    }

    /// Whether the breaker is reset when the scenario starts
    #[must_use]
    pub const fn resets_breaker(&self) -> bool {
        matches!(self, Self::ManagedChaos)
    }

    /// Whether callers are expected to use the protected path
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::ManagedChaos)
    }
}

impl TryFrom<u8> for DemoScenario {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Normal),
            2 => Ok(Self::ChaosLatency),
            3 => Ok(Self::ChaosWithFailures),
            4 => Ok(Self::ManagedChaos),
            other => Err(DomainError::InvalidScenario(other)),
        }
    }
}

impl fmt::Display for DemoScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.number(), self.label())
    }
}
