//! Simulated external service - Implements ExternalServicePort
//!
//! Stands in for a payment gateway or similar third-party API. Every call
//! passes through the [`FaultInjector`] first; the service body itself
//! takes a fixed baseline latency and never fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::ExternalServicePort;
use async_trait::async_trait;
use domain::ExternalResponse;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, instrument};

use crate::chaos::FaultInjector;

/// Settings of the simulated dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamConfig {
    /// Breaker name guarding the dependency
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Source reported in responses
    #[serde(default = "default_source")]
    pub source: String,

    /// Latency of a healthy call in milliseconds
    #[serde(default = "default_baseline_latency_ms")]
    pub baseline_latency_ms: u64,
}

fn default_service_name() -> String {
    "externalService".to_string()
}

fn default_source() -> String {
    "External Payment Service".to_string()
}

const fn default_baseline_latency_ms() -> u64 {
    200
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            source: default_source(),
            baseline_latency_ms: default_baseline_latency_ms(),
        }
    }
}

impl DownstreamConfig {
    /// Baseline latency as a duration
    #[must_use]
    pub const fn baseline_latency(&self) -> Duration {
        Duration::from_millis(self.baseline_latency_ms)
    }
}

/// Downstream service with chaos applied in front of it
#[derive(Debug, Clone)]
pub struct SimulatedExternalService {
    config: DownstreamConfig,
    injector: FaultInjector,
    calls: Arc<AtomicU64>,
}

impl SimulatedExternalService {
    /// Create the service behind `injector`
    pub fn new(config: DownstreamConfig, injector: FaultInjector) -> Self {
        Self {
            config,
            injector,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The fault injector in front of the service
    pub const fn injector(&self) -> &FaultInjector {
        &self.injector
    }

    /// Service settings
    pub const fn config(&self) -> &DownstreamConfig {
        &self.config
    }

    async fn respond(&self) -> Result<ExternalResponse, ApplicationError> {
        let call_number = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();
        info!(call_number, "External API call started");

        tokio::time::sleep(self.config.baseline_latency()).await;

        let response = ExternalResponse::success(&self.config.source, call_number, start.elapsed());
        info!(
            call_number,
            response_time_ms = response.response_time_ms,
            "External API responded"
        );
        Ok(response)
    }
}

#[async_trait]
impl ExternalServicePort for SimulatedExternalService {
    #[instrument(skip(self), fields(service = %self.config.service_name))]
    async fn call_external_api(&self) -> Result<ExternalResponse, ApplicationError> {
        self.injector.invoke(|| self.respond()).await
    }

    fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn reset_counter(&self) {
        self.calls.store(0, Ordering::SeqCst);
        info!("Call counter reset");
    }
}
