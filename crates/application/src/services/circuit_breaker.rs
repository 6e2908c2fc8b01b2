//! Circuit breaker pattern for protected calls
//!
//! Wraps the domain [`CircuitBreakerMachine`] in a per-breaker lock so that
//! admission, outcome recording and transitions are linearizable across
//! concurrent callers of the same breaker. Breakers are looked up by name
//! in a [`CircuitBreakerRegistry`]; the registry lock is held only for the
//! lookup, never across a call.
//!
//! # States
//!
//! - **Closed**: Normal operation, calls pass through
//! - **Open**: Dependency is failing, calls fail fast without invoking it
//! - **Half-Open**: Probe calls test whether the dependency has recovered
//!
//! # Example
//!
//! ```rust,ignore
//! use application::CircuitBreakerRegistry;
//!
//! let breaker = registry.breaker("externalService");
//! let permit = breaker.try_acquire()?;
//! let outcome = run_call().await;
//! permit.record(outcome);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domain::{
    CallOutcome, CallTicket, CircuitBreakerConfig, CircuitBreakerMachine, CircuitState,
    RecordResult, Transition,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CircuitOpenError;
use crate::ports::ClockPort;

/// Point-in-time view of a breaker's counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Current state name
    pub state: CircuitState,
    /// Failure rate of the window in percent
    pub failure_rate: f64,
    /// Outcomes currently held in the window
    pub buffered_calls: usize,
    /// Failed or timed-out outcomes in the window
    pub failed_calls: usize,
    /// Calls rejected since creation or the last reset
    pub not_permitted_calls: u64,
}

impl CircuitBreakerMetrics {
    /// Metrics of a closed breaker that has seen no calls
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_rate: 0.0,
            buffered_calls: 0,
            failed_calls: 0,
            not_permitted_calls: 0,
        }
    }
}

/// Circuit breaker guarding one named call-site
pub struct CircuitBreaker {
    name: String,
    machine: Mutex<CircuitBreakerMachine>,
    clock: Arc<dyn ClockPort>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a circuit breaker for `name`
    #[must_use]
    pub fn with_config(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            name: name.into(),
            machine: Mutex::new(CircuitBreakerMachine::new(config)),
            clock,
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state without changing it
    ///
    /// An open breaker whose cool-down has elapsed still reports `Open`
    /// until the next call arrives.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.machine.lock().circuit_state()
    }

    /// Returns a snapshot of the breaker's counters
    #[must_use]
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let machine = self.machine.lock();
        let window = machine.window();
        CircuitBreakerMetrics {
            state: machine.circuit_state(),
            failure_rate: window.failure_rate(),
            buffered_calls: window.len(),
            failed_calls: window.failure_count(),
            not_permitted_calls: machine.not_permitted_calls(),
        }
    }

    /// Asks the breaker to admit a call
    ///
    /// The returned permit must be given the call's outcome via
    /// [`CallPermit::record`]. Dropping it unrecorded frees any probe slot
    /// it held and records nothing.
    pub fn try_acquire(self: &Arc<Self>) -> Result<CallPermit, CircuitOpenError> {
        let now = self.clock.now();
        let admission = self.machine.lock().try_acquire(now);

        match admission {
            Ok(admission) => {
                if let Some(transition) = admission.transition {
                    self.log_transition(transition);
                }
                debug!(
                    circuit = %self.name,
                    probe = admission.ticket.is_probe(),
                    "Call permitted by circuit breaker"
                );
                Ok(CallPermit {
                    breaker: Arc::clone(self),
                    ticket: Some(admission.ticket),
                })
            },
            Err(rejection) => {
                warn!(
                    circuit = %self.name,
                    state = %rejection.state,
                    retry_after_ms = rejection.retry_after.map(|d| d.as_millis()),
                    "Circuit breaker preventing call to service"
                );
                Err(CircuitOpenError::from_rejection(&self.name, rejection))
            },
        }
    }

    /// Forces the breaker closed and clears its window
    ///
    /// Idempotent; outcomes of calls admitted before the reset are ignored.
    pub fn reset(&self) {
        let transition = self.machine.lock().reset();
        match transition {
            Some(transition) => self.log_transition(transition),
            None => debug!(circuit = %self.name, "Circuit breaker reset while closed"),
        }
    }

    fn on_outcome(&self, ticket: CallTicket, outcome: CallOutcome) {
        let now = self.clock.now();
        let (result, failure_rate) = {
            let mut machine = self.machine.lock();
            let result = machine.record(ticket, outcome, now);
            (result, machine.window().failure_rate())
        };

        match result {
            RecordResult::Recorded => debug!(
                circuit = %self.name,
                outcome = %outcome,
                failure_rate,
                "Recorded call outcome"
            ),
            RecordResult::Transitioned(transition) => {
                if transition.to == CircuitState::Open {
                    warn!(
                        circuit = %self.name,
                        outcome = %outcome,
                        failure_rate,
                        "Failure threshold reached"
                    );
                }
                self.log_transition(transition);
            },
            RecordResult::Discarded => debug!(
                circuit = %self.name,
                outcome = %outcome,
                "Discarded outcome of a call admitted before the last transition"
            ),
        }
    }

    fn release(&self, ticket: CallTicket) {
        self.machine.lock().release(ticket);
        debug!(
            circuit = %self.name,
            probe = ticket.is_probe(),
            "Call permit released without an outcome"
        );
    }

    fn log_transition(&self, transition: Transition) {
        match transition.to {
            CircuitState::Open => warn!(
                circuit = %self.name,
                from = %transition.from,
                to = %transition.to,
                "Circuit breaker opened"
            ),
            CircuitState::HalfOpen | CircuitState::Closed => info!(
                circuit = %self.name,
                from = %transition.from,
                to = %transition.to,
                "Circuit breaker state changed"
            ),
        }
    }
}

/// Admission to make one call through a breaker
#[must_use = "a permit must be given the call's outcome"]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    ticket: Option<CallTicket>,
}

impl fmt::Debug for CallPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPermit")
            .field("circuit", &self.breaker.name)
            .field("ticket", &self.ticket)
            .finish()
    }
}

impl CallPermit {
    /// Reports the call's outcome to the breaker
    pub fn record(mut self, outcome: CallOutcome) {
        if let Some(ticket) = self.ticket.take() {
            self.breaker.on_outcome(ticket, outcome);
        }
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.breaker.release(ticket);
        }
    }
}

/// Named circuit breakers sharing a clock and a default configuration
pub struct CircuitBreakerRegistry {
    default_config: CircuitBreakerConfig,
    clock: Arc<dyn ClockPort>,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("default_config", &self.default_config)
            .field("breakers", &self.names())
            .finish_non_exhaustive()
    }
}

impl CircuitBreakerRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new(default_config: CircuitBreakerConfig, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            default_config,
            clock,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the breaker for `name`, creating it with the default
    /// configuration on first use
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.read().get(name) {
            return Arc::clone(breaker);
        }

        let mut breakers = self.breakers.write();
        Arc::clone(breakers.entry(name.to_string()).or_insert_with(|| {
            debug!(circuit = %name, "Creating circuit breaker");
            Arc::new(CircuitBreaker::with_config(
                name,
                self.default_config.clone(),
                Arc::clone(&self.clock),
            ))
        }))
    }

    /// Returns the breaker for `name` if it exists
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.read().get(name).cloned()
    }

    /// State of the breaker for `name`; a breaker never used is closed
    #[must_use]
    pub fn state(&self, name: &str) -> CircuitState {
        self.find(name)
            .map_or(CircuitState::Closed, |breaker| breaker.state())
    }

    /// Counters of the breaker for `name`; a breaker never used is idle
    #[must_use]
    pub fn metrics(&self, name: &str) -> CircuitBreakerMetrics {
        self.find(name)
            .map_or_else(CircuitBreakerMetrics::idle, |breaker| breaker.metrics())
    }

    /// Resets the breaker for `name`, if it exists
    pub fn reset(&self, name: &str) {
        if let Some(breaker) = self.find(name) {
            breaker.reset();
        }
    }

    /// Names of all registered breakers, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.breakers.read().keys().cloned().collect();
        names.sort();
        names
    }
}
