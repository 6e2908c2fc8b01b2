//! Fault-injection settings

use serde::{Deserialize, Serialize};

use super::LatencyRange;

/// Settings read by the fault injector on every downstream call
///
/// `latency_active` and `failure_active` only take effect while `enabled`
/// is set. Failure injection is a binary toggle: when active, every call
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InjectionConfig {
    /// Master switch
    pub enabled: bool,
    /// Delay each call by a duration drawn from `latency_range`
    pub latency_active: bool,
    /// Range the injected delay is drawn from
    pub latency_range: LatencyRange,
    /// Fail each call instead of invoking the downstream
    pub failure_active: bool,
}

impl InjectionConfig {
    /// Injection switched off entirely
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Latency injection only
    #[must_use]
    pub const fn latency(range: LatencyRange) -> Self {
        Self {
            enabled: true,
            latency_active: true,
            latency_range: range,
            failure_active: false,
        }
    }

    /// Failure injection only
    #[must_use]
    pub fn failures() -> Self {
        Self {
            enabled: true,
            failure_active: true,
            ..Self::default()
        }
    }

    /// Latency followed by a synthetic failure
    #[must_use]
    pub const fn latency_and_failures(range: LatencyRange) -> Self {
        Self {
            enabled: true,
            latency_active: true,
            latency_range: range,
            failure_active: true,
        }
    }

    /// Whether a delay should be injected
    #[must_use]
    pub const fn injects_latency(&self) -> bool {
        self.enabled && self.latency_active
    }

    /// Whether a synthetic failure should be raised
    #[must_use]
    pub const fn injects_failure(&self) -> bool {
        self.enabled && self.failure_active
    }
}
