//! Degraded results for calls that could not complete
//!
//! Handlers are selected by an explicit match on the error variant. A chain
//! always has a default handler, so [`FallbackChain::fallback`] always
//! yields a value.

use std::fmt;

use crate::error::ResilienceError;

type Handler<T> = Box<dyn Fn(&ResilienceError) -> T + Send + Sync>;

/// Maps resilience errors to substitute values
pub struct FallbackChain<T> {
    on_circuit_open: Option<Handler<T>>,
    on_timeout: Option<Handler<T>>,
    on_failure: Option<Handler<T>>,
    default: Handler<T>,
}

impl<T> fmt::Debug for FallbackChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("on_circuit_open", &self.on_circuit_open.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> FallbackChain<T> {
    /// Chain whose every reason is handled by `default`
    pub fn new(default: impl Fn(&ResilienceError) -> T + Send + Sync + 'static) -> Self {
        Self {
            on_circuit_open: None,
            on_timeout: None,
            on_failure: None,
            default: Box::new(default),
        }
    }

    /// Handler for calls rejected by an open breaker
    #[must_use]
    pub fn on_circuit_open(
        mut self,
        handler: impl Fn(&ResilienceError) -> T + Send + Sync + 'static,
    ) -> Self {
        self.on_circuit_open = Some(Box::new(handler));
        self
    }

    /// Handler for calls that ran out of time
    #[must_use]
    pub fn on_timeout(
        mut self,
        handler: impl Fn(&ResilienceError) -> T + Send + Sync + 'static,
    ) -> Self {
        self.on_timeout = Some(Box::new(handler));
        self
    }

    /// Handler for calls that failed on their own
    #[must_use]
    pub fn on_failure(
        mut self,
        handler: impl Fn(&ResilienceError) -> T + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(handler));
        self
    }

    /// Produce the substitute value for `error`
    pub fn fallback(&self, error: &ResilienceError) -> T {
        let specific = match error {
            ResilienceError::CircuitOpen(_) => self.on_circuit_open.as_ref(),
            ResilienceError::Timeout(_) => self.on_timeout.as_ref(),
            ResilienceError::DownstreamFailure { .. } => self.on_failure.as_ref(),
        };
        specific.unwrap_or(&self.default)(error)
    }
}
