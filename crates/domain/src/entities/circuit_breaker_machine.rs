//! Three-state circuit breaker logic
//!
//! The machine holds no lock and reads no clock: callers pass `now` in and
//! serialize access themselves. Every admitted call receives a
//! [`CallTicket`] stamped with the current generation; the generation is
//! bumped on every transition so outcomes from calls admitted under an
//! earlier state are discarded instead of being folded into the new one.
//!
//! ```text
//! Closed   → Open:     window holds ≥ minimum calls and failure rate ≥ threshold
//! Open     → HalfOpen: first call after the cool-down, admitted as a probe
//! HalfOpen → Closed:   the configured number of probes succeeded (window cleared)
//! HalfOpen → Open:     any probe failed or timed out
//! any      → Closed:   reset (window cleared)
//! ```

use std::time::{Duration, Instant};

use super::SlidingWindow;
use crate::value_objects::{CallOutcome, CircuitBreakerConfig, CircuitState};

/// Current breaker state with its per-state data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass through and are recorded in the window
    Closed,
    /// Calls are rejected until the cool-down has elapsed
    Open {
        /// When the circuit last opened
        opened_at: Instant,
    },
    /// Probe calls are admitted one at a time
    HalfOpen {
        /// Successful probes still needed before closing
        probes_remaining: u32,
        /// Whether a probe is currently running
        probe_in_flight: bool,
    },
}

impl BreakerState {
    /// State name without its data
    #[must_use]
    pub const fn name(&self) -> CircuitState {
        match self {
            Self::Closed => CircuitState::Closed,
            Self::Open { .. } => CircuitState::Open,
            Self::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

/// Proof that a call was admitted; hand it back with the call's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTicket {
    generation: u64,
    probe: bool,
}

impl CallTicket {
    /// Whether the call was admitted as a half-open probe
    #[must_use]
    pub const fn is_probe(&self) -> bool {
        self.probe
    }

    /// Generation the ticket was issued under
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A change of state name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the change
    pub from: CircuitState,
    /// State after the change
    pub to: CircuitState,
}

/// An admitted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Ticket to return with the outcome
    pub ticket: CallTicket,
    /// Transition caused by admitting the call (Open → HalfOpen)
    pub transition: Option<Transition>,
}

/// A rejected call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallNotPermitted {
    /// State that rejected the call
    pub state: CircuitState,
    /// Remaining cool-down, when the circuit is open
    pub retry_after: Option<Duration>,
}

/// What happened to a recorded outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordResult {
    /// Folded into the current state without a transition
    Recorded,
    /// Folded in and caused a transition
    Transitioned(Transition),
    /// Issued under an earlier generation and ignored
    Discarded,
}

/// Lock-free circuit breaker state machine
#[derive(Debug, Clone)]
pub struct CircuitBreakerMachine {
    config: CircuitBreakerConfig,
    state: BreakerState,
    window: SlidingWindow,
    generation: u64,
    not_permitted_calls: u64,
}

impl CircuitBreakerMachine {
    /// Create a closed machine with an empty window
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let window = SlidingWindow::new(config.sliding_window_size as usize);
        Self {
            config,
            state: BreakerState::Closed,
            window,
            generation: 0,
            not_permitted_calls: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> BreakerState {
        self.state
    }

    /// Current state name
    #[must_use]
    pub const fn circuit_state(&self) -> CircuitState {
        self.state.name()
    }

    /// Recorded outcomes
    #[must_use]
    pub const fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Calls rejected since creation or the last reset
    #[must_use]
    pub const fn not_permitted_calls(&self) -> u64 {
        self.not_permitted_calls
    }

    /// Ask to admit a call at `now`
    pub fn try_acquire(&mut self, now: Instant) -> Result<Admission, CallNotPermitted> {
        match self.state {
            BreakerState::Closed => Ok(Admission {
                ticket: self.ticket(false),
                transition: None,
            }),
            BreakerState::Open { opened_at } => {
                let elapsed = now.saturating_duration_since(opened_at);
                let wait = self.config.wait_duration_in_open_state();
                if elapsed >= wait {
                    let transition = self.enter(BreakerState::HalfOpen {
                        probes_remaining: self.config.permitted_number_of_calls_in_half_open_state,
                        probe_in_flight: true,
                    });
                    Ok(Admission {
                        ticket: self.ticket(true),
                        transition: Some(transition),
                    })
                } else {
                    self.not_permitted_calls += 1;
                    Err(CallNotPermitted {
                        state: CircuitState::Open,
                        retry_after: Some(wait - elapsed),
                    })
                }
            },
            BreakerState::HalfOpen {
                probes_remaining,
                probe_in_flight,
            } => {
                if probe_in_flight {
                    self.not_permitted_calls += 1;
                    Err(CallNotPermitted {
                        state: CircuitState::HalfOpen,
                        retry_after: None,
                    })
                } else {
                    self.state = BreakerState::HalfOpen {
                        probes_remaining,
                        probe_in_flight: true,
                    };
                    Ok(Admission {
                        ticket: self.ticket(true),
                        transition: None,
                    })
                }
            },
        }
    }

    /// Fold the outcome of an admitted call into the state
    pub fn record(&mut self, ticket: CallTicket, outcome: CallOutcome, now: Instant) -> RecordResult {
        if ticket.generation != self.generation {
            return RecordResult::Discarded;
        }

        match self.state {
            BreakerState::Closed => {
                self.window.record(outcome);
                if self.threshold_exceeded() {
                    RecordResult::Transitioned(self.enter(BreakerState::Open { opened_at: now }))
                } else {
                    RecordResult::Recorded
                }
            },
            BreakerState::HalfOpen {
                probes_remaining, ..
            } => {
                if outcome.is_failure() {
                    return RecordResult::Transitioned(
                        self.enter(BreakerState::Open { opened_at: now }),
                    );
                }
                let probes_remaining = probes_remaining.saturating_sub(1);
                if probes_remaining == 0 {
                    self.window.clear();
                    RecordResult::Transitioned(self.enter(BreakerState::Closed))
                } else {
                    self.state = BreakerState::HalfOpen {
                        probes_remaining,
                        probe_in_flight: false,
                    };
                    RecordResult::Recorded
                }
            },
            BreakerState::Open { .. } => RecordResult::Discarded,
        }
    }

    /// Give back a ticket whose call produced no outcome
    ///
    /// Frees the half-open probe slot; nothing is recorded.
    pub fn release(&mut self, ticket: CallTicket) {
        if ticket.generation != self.generation || !ticket.probe {
            return;
        }
        if let BreakerState::HalfOpen {
            probes_remaining, ..
        } = self.state
        {
            self.state = BreakerState::HalfOpen {
                probes_remaining,
                probe_in_flight: false,
            };
        }
    }

    /// Force the closed state and clear the window
    pub fn reset(&mut self) -> Option<Transition> {
        self.window.clear();
        self.not_permitted_calls = 0;
        let transition = self.enter(BreakerState::Closed);
        (transition.from != transition.to).then_some(transition)
    }

    fn threshold_exceeded(&self) -> bool {
        self.window.len() >= self.config.minimum_number_of_calls as usize
            && self.window.failure_rate() >= self.config.failure_rate_threshold
    }

    fn ticket(&self, probe: bool) -> CallTicket {
        CallTicket {
            generation: self.generation,
            probe,
        }
    }

    fn enter(&mut self, next: BreakerState) -> Transition {
        let from = self.state.name();
        self.state = next;
        self.generation += 1;
        Transition {
            from,
            to: next.name(),
        }
    }
}
