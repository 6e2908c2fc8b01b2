//! Domain entities - Objects with state and lifecycle

mod call_attempt;
mod circuit_breaker_machine;
mod order;
mod sliding_window;

pub use call_attempt::CallAttempt;
pub use circuit_breaker_machine::{
    Admission, BreakerState, CallNotPermitted, CallTicket, CircuitBreakerMachine, RecordResult,
    Transition,
};
pub use order::{DegradedOrder, ExternalResponse, OrderReceipt, OrderResponse, OrderStatus};
pub use sliding_window::SlidingWindow;
