//! External service port
//!
//! The dependency protected by the resilience layer.

use async_trait::async_trait;
use domain::ExternalResponse;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the downstream service call
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExternalServicePort: Send + Sync {
    /// Call the external API once
    async fn call_external_api(&self) -> Result<ExternalResponse, ApplicationError>;

    /// Number of calls that reached the service body
    fn call_count(&self) -> u64;

    /// Reset the invocation counter to zero
    fn reset_counter(&self);
}
