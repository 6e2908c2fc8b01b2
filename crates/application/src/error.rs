//! Application-level errors

use std::error::Error as StdError;
use std::time::Duration;

use domain::{CallNotPermitted, CircuitState, DomainError, FallbackReason};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The breaker rejected a call without invoking the dependency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Circuit breaker '{name}' is {state} and does not permit further calls")]
pub struct CircuitOpenError {
    /// Name of the breaker
    pub name: String,
    /// State that rejected the call
    pub state: CircuitState,
    /// Remaining cool-down, when known
    pub retry_after: Option<Duration>,
}

impl CircuitOpenError {
    /// Build from the state machine's rejection
    pub fn from_rejection(name: impl Into<String>, rejection: CallNotPermitted) -> Self {
        Self {
            name: name.into(),
            state: rejection.state,
            retry_after: rejection.retry_after,
        }
    }
}

/// A call exceeded its allotted duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Call did not complete within {}ms", .timeout.as_millis())]
pub struct TimeoutError {
    /// Limit that was exceeded
    pub timeout: Duration,
}

/// Resilience failure taxonomy
///
/// `CircuitOpen` and `Timeout` are produced by the resilience layer itself;
/// `DownstreamFailure` wraps the protected call's own error.
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// The breaker rejected the call
    #[error(transparent)]
    CircuitOpen(#[from] CircuitOpenError),

    /// The call ran out of time
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The call failed on its own
    #[error("Downstream failure: {message}")]
    DownstreamFailure {
        /// Message of the original error
        message: String,
        /// The original error, when one was available
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl ResilienceError {
    /// Wrap a downstream error
    pub fn downstream(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        let source = error.into();
        Self::DownstreamFailure {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// A downstream failure known only by its message
    pub fn downstream_message(message: impl Into<String>) -> Self {
        Self::DownstreamFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Fallback reason this error maps to
    #[must_use]
    pub const fn reason(&self) -> FallbackReason {
        match self {
            Self::CircuitOpen(_) => FallbackReason::CircuitOpen,
            Self::Timeout(_) => FallbackReason::Timeout,
            Self::DownstreamFailure { .. } => FallbackReason::Failure,
        }
    }

    /// Message of the downstream error, for `DownstreamFailure` only
    #[must_use]
    pub fn original_message(&self) -> Option<&str> {
        match self {
            Self::DownstreamFailure { message, .. } => Some(message),
            Self::CircuitOpen(_) | Self::Timeout(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_open_error_display() {
        let err = CircuitOpenError {
            name: "externalService".to_string(),
            state: CircuitState::Open,
            retry_after: None,
        };
        assert_eq!(
            err.to_string(),
            "Circuit breaker 'externalService' is OPEN and does not permit further calls"
        );
    }

    #[test]
    fn timeout_error_display() {
        let err = TimeoutError {
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "Call did not complete within 2000ms");
    }

    #[test]
    fn downstream_keeps_source_and_message() {
        let err = ResilienceError::downstream(ApplicationError::ExternalService(
            "connection reset".to_string(),
        ));
        assert_eq!(err.reason(), FallbackReason::Failure);
        assert_eq!(
            err.original_message(),
            Some("External service error: connection reset")
        );
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn reasons_follow_variants() {
        let open = ResilienceError::from(CircuitOpenError {
            name: "svc".to_string(),
            state: CircuitState::HalfOpen,
            retry_after: None,
        });
        let timeout = ResilienceError::from(TimeoutError {
            timeout: Duration::from_millis(10),
        });
        assert_eq!(open.reason(), FallbackReason::CircuitOpen);
        assert_eq!(timeout.reason(), FallbackReason::Timeout);
        assert!(open.original_message().is_none());
        assert!(timeout.original_message().is_none());
    }

    #[test]
    fn domain_error_is_transparent() {
        let err = ApplicationError::from(DomainError::InvalidScenario(7));
        assert_eq!(err.to_string(), DomainError::InvalidScenario(7).to_string());
    }
}
