//! Order processing against the external service
//!
//! Two paths: [`OrderService::process_order`] calls the dependency directly
//! and inherits every delay and error it produces, while
//! [`OrderService::process_order_protected`] goes through the resilience
//! context and always answers with a completed or degraded order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::{DegradedOrder, FallbackReason, OrderReceipt, OrderResponse};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use super::fallback::FallbackChain;
use super::resilience_context::ResilienceContext;
use crate::error::ApplicationError;
use crate::ports::ExternalServicePort;

/// Places orders that depend on the external service
pub struct OrderService {
    external: Arc<dyn ExternalServicePort>,
    context: Arc<ResilienceContext>,
    circuit_name: String,
    timeout: Duration,
    fallback: FallbackChain<OrderResponse>,
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService")
            .field("circuit_name", &self.circuit_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OrderService {
    /// Create the service; protected calls use the context's default timeout
    #[must_use]
    pub fn new(
        external: Arc<dyn ExternalServicePort>,
        context: Arc<ResilienceContext>,
        circuit_name: impl Into<String>,
    ) -> Self {
        let timeout = context.default_timeout();
        Self {
            external,
            context,
            circuit_name: circuit_name.into(),
            timeout,
            fallback: order_fallback(),
        }
    }

    /// Override the protected call's time limit
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the breaker guarding the protected path
    #[must_use]
    pub fn circuit_name(&self) -> &str {
        &self.circuit_name
    }

    /// Time limit applied to protected calls
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn external(&self) -> &Arc<dyn ExternalServicePort> {
        &self.external
    }

    /// Process an order without any protection
    #[instrument(skip(self))]
    pub async fn process_order(&self) -> Result<OrderReceipt, ApplicationError> {
        let start = Instant::now();
        let response = self.external.call_external_api().await.inspect_err(|e| {
            warn!(
                elapsed_ms = start.elapsed().as_millis(),
                error = %e,
                "Unprotected order failed"
            );
        })?;

        let receipt = OrderReceipt::completed(false, start.elapsed(), response);
        info!(
            order_id = %receipt.order_id,
            elapsed_ms = receipt.processing_time_ms,
            "Unprotected order completed"
        );
        Ok(receipt)
    }

    /// Process an order through breaker, time limit and fallback
    #[instrument(skip(self), fields(circuit = %self.circuit_name))]
    pub async fn process_order_protected(&self) -> OrderResponse {
        let external = Arc::clone(&self.external);
        let start = Instant::now();

        let response = self
            .context
            .execute(
                &self.circuit_name,
                self.timeout,
                move || async move {
                    let response = external.call_external_api().await?;
                    Ok::<_, ApplicationError>(OrderResponse::Completed(OrderReceipt::completed(
                        true,
                        start.elapsed(),
                        response,
                    )))
                },
                &self.fallback,
            )
            .await;

        info!(
            order_id = %response.order_id(),
            degraded = response.is_degraded(),
            elapsed_ms = start.elapsed().as_millis(),
            "Protected order processed"
        );
        response
    }
}

fn order_fallback() -> FallbackChain<OrderResponse> {
    FallbackChain::new(|error| {
        OrderResponse::Degraded(DegradedOrder::new(
            error.reason(),
            Some(error.to_string()),
        ))
    })
    .on_timeout(|_| OrderResponse::Degraded(DegradedOrder::new(FallbackReason::Timeout, None)))
    .on_failure(|error| {
        OrderResponse::Degraded(DegradedOrder::new(
            FallbackReason::Failure,
            error.original_message().map(ToString::to_string),
        ))
    })
}
