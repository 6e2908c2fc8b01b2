//! Wiring of the resilience core with its adapters

use std::sync::Arc;
use std::time::Duration;

use application::{
    CircuitBreakerMetrics, DemoService, DemoStatus, ExternalServicePort, InjectionSettings,
    OrderService, ResilienceContext,
};
use domain::{DemoScenario, OrderReceipt, OrderResponse};
use infrastructure::{AppConfig, ChaosStats, FaultInjector, SimulatedExternalService, SystemClock};
use serde::Serialize;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::info;

/// Result of one order as printed by the CLI
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderOutput {
    /// Protected path; always a value
    Protected(OrderResponse),
    /// Unprotected path, completed
    Unprotected(OrderReceipt),
    /// Unprotected path, failed
    Failed {
        /// Error returned by the dependency
        error: String,
        /// Time the caller waited
        elapsed_ms: u64,
    },
}

/// Status report combining the demo and the fault injector
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Scenario, injection, breaker and counter
    #[serde(flatten)]
    pub demo: DemoStatus,
    /// Fault injector counters
    pub chaos: ChaosStats,
}

/// State of the breaker guarding the external service
#[derive(Debug, Serialize)]
pub struct BreakerReport {
    /// Breaker name
    pub circuit: String,
    /// Current counters
    #[serde(flatten)]
    pub metrics: CircuitBreakerMetrics,
}

/// The assembled application
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    service: Arc<SimulatedExternalService>,
    context: Arc<ResilienceContext>,
    orders: Arc<OrderService>,
    demo: DemoService,
}

impl App {
    /// Build every component from configuration
    ///
    /// `order_timeout` overrides the configured time limit of protected
    /// orders.
    pub fn build(config: AppConfig, order_timeout: Option<Duration>) -> anyhow::Result<Self> {
        let settings = InjectionSettings::new(config.chaos.to_injection_config()?);
        let service = Arc::new(SimulatedExternalService::new(
            config.downstream.clone(),
            FaultInjector::new(settings.clone()),
        ));
        let context = Arc::new(ResilienceContext::from_config(
            config.resilience.circuit_breaker.clone(),
            config.resilience.time_limiter,
            settings,
            Arc::new(SystemClock),
        ));

        let circuit = config.downstream.service_name.clone();
        let external: Arc<dyn ExternalServicePort> = Arc::<SimulatedExternalService>::clone(&service);
        let mut orders = OrderService::new(external, Arc::clone(&context), circuit);
        if let Some(timeout) = order_timeout {
            orders = orders.with_timeout(timeout);
        }
        let demo = DemoService::new(Arc::clone(&context), &orders);

        info!(
            circuit = %orders.circuit_name(),
            timeout_ms = duration_ms(orders.timeout()),
            "Application assembled"
        );
        let orders = Arc::new(orders);

        Ok(Self {
            config,
            service,
            context,
            orders,
            demo,
        })
    }

    /// Effective configuration
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current status
    pub fn status(&self) -> StatusReport {
        StatusReport {
            demo: self.demo.status(),
            chaos: self.service.injector().stats(),
        }
    }

    /// State of the guarding breaker; never creates one
    pub fn breaker(&self) -> BreakerReport {
        let circuit = self.orders.circuit_name();
        BreakerReport {
            circuit: circuit.to_string(),
            metrics: self.context.breaker_metrics(circuit),
        }
    }

    /// Force the guarding breaker closed
    pub fn reset_breaker(&self) {
        self.demo.reset_circuit_breaker();
    }

    /// Zero the downstream call counter and the fault injector's statistics
    pub fn reset_counters(&self) {
        self.demo.reset_counter();
        self.service.injector().reset_stats();
    }

    /// Apply scenario `number` and place `count` orders under it
    pub async fn run_scenario(
        &self,
        number: u8,
        count: usize,
        force_protected: bool,
    ) -> anyhow::Result<(DemoScenario, Vec<OrderOutput>)> {
        let scenario = self.demo.apply_scenario_number(number)?;
        let protected = force_protected || scenario.is_protected();
        let outputs = self.place_orders(count, protected, false).await;
        Ok((scenario, outputs))
    }

    /// Place `count` orders, sequentially or all at once
    pub async fn place_orders(
        &self,
        count: usize,
        protected: bool,
        parallel: bool,
    ) -> Vec<OrderOutput> {
        if !parallel {
            let mut outputs = Vec::with_capacity(count);
            for _ in 0..count {
                outputs.push(place_order(&self.orders, protected).await);
            }
            return outputs;
        }

        let mut set = JoinSet::new();
        for _ in 0..count {
            let orders = Arc::clone(&self.orders);
            set.spawn(async move { place_order(&orders, protected).await });
        }

        let mut outputs = Vec::with_capacity(count);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(output) => outputs.push(output),
                Err(e) => outputs.push(OrderOutput::Failed {
                    error: e.to_string(),
                    elapsed_ms: 0,
                }),
            }
        }
        outputs
    }
}

async fn place_order(orders: &OrderService, protected: bool) -> OrderOutput {
    if protected {
        return OrderOutput::Protected(orders.process_order_protected().await);
    }

    let start = Instant::now();
    match orders.process_order().await {
        Ok(receipt) => OrderOutput::Unprotected(receipt),
        Err(e) => OrderOutput::Failed {
            error: e.to_string(),
            elapsed_ms: duration_ms(start.elapsed()),
        },
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
