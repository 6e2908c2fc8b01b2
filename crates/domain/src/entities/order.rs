//! Order and downstream response entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::value_objects::FallbackReason;

/// Payload returned by the downstream service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResponse {
    /// Name of the answering system
    pub source: String,
    /// Always `SUCCESS` for a returned response
    pub status: String,
    /// Value of the invocation counter for this call
    pub call_number: u64,
    /// Time the downstream spent answering
    pub response_time_ms: u64,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ExternalResponse {
    /// Create a successful response
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn success(source: impl Into<String>, call_number: u64, response_time: Duration) -> Self {
        Self {
            source: source.into(),
            status: "SUCCESS".to_string(),
            call_number,
            response_time_ms: response_time.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }
}

/// Processing status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Processed with a real downstream response
    Completed,
    /// Answered by a fallback
    Degraded,
}

/// An order processed with a real downstream response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Order identifier, `ORD-<n>`
    pub order_id: String,
    /// Always `Completed`
    pub status: OrderStatus,
    /// Whether the protected path produced it
    pub protected: bool,
    /// End-to-end processing time
    pub processing_time_ms: u64,
    /// Embedded downstream payload
    pub external_service: ExternalResponse,
    /// When processing finished
    pub timestamp: DateTime<Utc>,
}

impl OrderReceipt {
    /// Build a completed order
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn completed(
        protected: bool,
        processing_time: Duration,
        external_service: ExternalResponse,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            order_id: format!("ORD-{}", order_number(timestamp)),
            status: OrderStatus::Completed,
            protected,
            processing_time_ms: processing_time.as_millis() as u64,
            external_service,
            timestamp,
        }
    }
}

/// A degraded-but-valid order produced by a fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedOrder {
    /// `ORD-TIMEOUT-<n>` for timeouts, `ORD-FALLBACK-<n>` otherwise
    pub order_id: String,
    /// Always `Degraded`
    pub status: OrderStatus,
    /// Fallbacks only exist on the protected path
    pub protected: bool,
    /// Why the fallback ran
    pub fallback_reason: FallbackReason,
    /// Message for the client
    pub message: String,
    /// Message of the error that caused the fallback, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
    /// When the fallback was produced
    pub timestamp: DateTime<Utc>,
}

impl DegradedOrder {
    /// Build the degraded order for a fallback reason
    #[must_use]
    pub fn new(reason: FallbackReason, original_error: Option<String>) -> Self {
        let timestamp = Utc::now();
        let (prefix, message) = match reason {
            FallbackReason::Timeout => (
                "ORD-TIMEOUT",
                "Service is slow, returning fallback response",
            ),
            FallbackReason::CircuitOpen | FallbackReason::Failure => (
                "ORD-FALLBACK",
                "Order queued, it will be processed later",
            ),
        };
        Self {
            order_id: format!("{prefix}-{}", order_number(timestamp)),
            status: OrderStatus::Degraded,
            protected: true,
            fallback_reason: reason,
            message: message.to_string(),
            original_error,
            timestamp,
        }
    }
}

/// Either a completed order or its fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderResponse {
    /// Downstream answered in time
    Completed(OrderReceipt),
    /// Fallback answered
    Degraded(DegradedOrder),
}

impl OrderResponse {
    /// Whether a fallback produced this response
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Fallback reason, if degraded
    #[must_use]
    pub const fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded(order) => Some(order.fallback_reason),
        }
    }

    /// Order identifier
    #[must_use]
    pub fn order_id(&self) -> &str {
        match self {
            Self::Completed(receipt) => &receipt.order_id,
            Self::Degraded(order) => &order.order_id,
        }
    }
}

fn order_number(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis() % 10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_receipt_has_order_prefix() {
        let external = ExternalResponse::success("Payments", 7, Duration::from_millis(200));
        let receipt = OrderReceipt::completed(true, Duration::from_millis(205), external);

        assert!(receipt.order_id.starts_with("ORD-"));
        assert_eq!(receipt.status, OrderStatus::Completed);
        assert_eq!(receipt.processing_time_ms, 205);
        assert_eq!(receipt.external_service.call_number, 7);
        assert_eq!(receipt.external_service.status, "SUCCESS");
    }

    #[test]
    fn timeout_fallback_uses_timeout_prefix() {
        let order = DegradedOrder::new(FallbackReason::Timeout, None);
        assert!(order.order_id.starts_with("ORD-TIMEOUT-"));
        assert_eq!(order.status, OrderStatus::Degraded);
    }

    #[test]
    fn failure_fallback_keeps_original_error() {
        let order = DegradedOrder::new(
            FallbackReason::Failure,
            Some("Injected failure".to_string()),
        );
        assert!(order.order_id.starts_with("ORD-FALLBACK-"));
        assert_eq!(order.original_error.as_deref(), Some("Injected failure"));
    }

    #[test]
    fn response_reports_reason() {
        let response = OrderResponse::Degraded(DegradedOrder::new(FallbackReason::CircuitOpen, None));
        assert!(response.is_degraded());
        assert_eq!(response.fallback_reason(), Some(FallbackReason::CircuitOpen));
    }

    #[test]
    fn degraded_serializes_without_missing_error() {
        let order = DegradedOrder::new(FallbackReason::Timeout, None);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "DEGRADED");
        assert_eq!(json["fallback_reason"], "TIMEOUT");
        assert!(json.get("original_error").is_none());
    }
}
