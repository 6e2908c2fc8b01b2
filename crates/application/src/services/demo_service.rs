//! Demo scenario control
//!
//! Applies the four chaos presets through the resilience context's
//! administrative operations and reports the resulting status.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::{DemoScenario, InjectionConfig};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::circuit_breaker::CircuitBreakerMetrics;
use super::order_service::OrderService;
use super::resilience_context::ResilienceContext;
use crate::error::ApplicationError;
use crate::ports::ExternalServicePort;

/// Snapshot of the demo's moving parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoStatus {
    /// Active scenario
    pub current_scenario: DemoScenario,
    /// Active fault-injection settings
    pub injection: InjectionConfig,
    /// Breaker guarding the external service
    pub circuit_breaker: CircuitBreakerMetrics,
    /// Time limit of protected calls
    pub timeout_ms: u64,
    /// Calls that reached the external service
    pub downstream_calls: u64,
}

/// Switches between demo scenarios
pub struct DemoService {
    context: Arc<ResilienceContext>,
    external: Arc<dyn ExternalServicePort>,
    circuit_name: String,
    timeout: Duration,
    current: RwLock<DemoScenario>,
}

impl fmt::Debug for DemoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoService")
            .field("circuit_name", &self.circuit_name)
            .field("current", &self.current_scenario())
            .finish_non_exhaustive()
    }
}

impl DemoService {
    /// Create the service in the `Normal` scenario, controlling the
    /// dependency, breaker and time limit used by `orders`
    ///
    /// The context's injection settings are left as they are.
    #[must_use]
    pub fn new(context: Arc<ResilienceContext>, orders: &OrderService) -> Self {
        Self {
            context,
            external: Arc::clone(orders.external()),
            circuit_name: orders.circuit_name().to_string(),
            timeout: orders.timeout(),
            current: RwLock::new(DemoScenario::Normal),
        }
    }

    /// Active scenario
    #[must_use]
    pub fn current_scenario(&self) -> DemoScenario {
        *self.current.read()
    }

    /// Switch to `scenario`
    pub fn apply_scenario(&self, scenario: DemoScenario) {
        self.context.set_injection_config(scenario.injection_config());
        if scenario.resets_breaker() {
            self.context.reset_breaker(&self.circuit_name);
        }
        *self.current.write() = scenario;

        info!(
            scenario = %scenario,
            protected = scenario.is_protected(),
            "Demo scenario applied"
        );
    }

    /// Switch to the scenario numbered `number` (1-4)
    pub fn apply_scenario_number(&self, number: u8) -> Result<DemoScenario, ApplicationError> {
        let scenario = DemoScenario::try_from(number)?;
        self.apply_scenario(scenario);
        Ok(scenario)
    }

    /// Force the guarding breaker closed
    pub fn reset_circuit_breaker(&self) {
        self.context.reset_breaker(&self.circuit_name);
    }

    /// Reset the external service's call counter
    pub fn reset_counter(&self) {
        self.external.reset_counter();
        info!("External service call counter reset");
    }

    /// Current status
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn status(&self) -> DemoStatus {
        DemoStatus {
            current_scenario: self.current_scenario(),
            injection: self.context.injection_config(),
            circuit_breaker: self.context.breaker_metrics(&self.circuit_name),
            timeout_ms: self.timeout.as_millis() as u64,
            downstream_calls: self.external.call_count(),
        }
    }
}
