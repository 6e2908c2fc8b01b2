//! Live fault-injection settings shared between the admin surface and the
//! fault injector

use std::sync::Arc;

use arc_swap::ArcSwap;
use domain::InjectionConfig;
use tracing::info;

/// Atomically swappable [`InjectionConfig`]
///
/// Readers take a snapshot per call, so a change applies from the next call
/// on and never to one already in flight.
#[derive(Debug, Clone)]
pub struct InjectionSettings {
    inner: Arc<ArcSwap<InjectionConfig>>,
}

impl Default for InjectionSettings {
    fn default() -> Self {
        Self::new(InjectionConfig::disabled())
    }
}

impl InjectionSettings {
    /// Create settings starting from `config`
    #[must_use]
    pub fn new(config: InjectionConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current settings
    #[must_use]
    pub fn current(&self) -> InjectionConfig {
        **self.inner.load()
    }

    /// Replace the settings
    pub fn set(&self, config: InjectionConfig) {
        let previous = self.inner.swap(Arc::new(config));
        info!(
            enabled = config.enabled,
            latency_active = config.latency_active,
            latency_range = %config.latency_range,
            failure_active = config.failure_active,
            was_enabled = previous.enabled,
            "Fault injection settings updated"
        );
    }
}
