//! Cloud provider client port
//!
//! `cf:` and `s3:` references go through a single request/response call;
//! authentication, retries and transport live behind this trait.

use async_trait::async_trait;
use nimbus_domain::Value;

/// Errors reported by a provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected or failed the request.
    #[error("{0}")]
    Request(String),

    /// The response could not be understood.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    /// No provider has been configured.
    #[error("no cloud provider is configured")]
    NotConfigured,
}

/// Port for cloud provider API calls.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Performs `operation` on `service` with `params`.
    ///
    /// # Arguments
    /// * `service` - Provider service name (`CloudFormation`, `S3`)
    /// * `operation` - Operation name (`describeStacks`, `getObject`)
    /// * `params` - Operation parameters
    /// * `stage` - Active stage, if any
    /// * `region` - Active region, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn request(
        &self,
        service: &str,
        operation: &str,
        params: Value,
        stage: Option<&str>,
        region: Option<&str>,
    ) -> Result<Value, ProviderError>;
}

/// A client that fails every request with [`ProviderError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredProviderClient;

#[async_trait]
impl ProviderClient for UnconfiguredProviderClient {
    async fn request(
        &self,
        _service: &str,
        _operation: &str,
        _params: Value,
        _stage: Option<&str>,
        _region: Option<&str>,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::NotConfigured)
    }
}
