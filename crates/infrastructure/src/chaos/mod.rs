//! Chaos engineering for the downstream call
//!
//! The [`FaultInjector`] sits between a caller and the downstream service and
//! perturbs each call according to the live
//! [`InjectionSettings`](application::InjectionSettings):
//!
//! - added latency drawn uniformly from the configured range
//! - a synthetic failure instead of the downstream call
//!
//! # Example
//!
//! ```ignore
//! use application::InjectionSettings;
//! use infrastructure::chaos::FaultInjector;
//!
//! let injector = FaultInjector::new(InjectionSettings::default());
//! let result = injector.invoke(|| async { Ok::<_, ApplicationError>(42) }).await;
//! ```

mod chaos_stats;
mod fault_injector;

pub use chaos_stats::ChaosStats;
pub use fault_injector::{FaultInjector, InjectedError, sample_latency};
