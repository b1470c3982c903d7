//! Provider client talking to an HTTP gateway.
//!
//! Each request is a JSON `POST` of
//! `{service, operation, params, stage, region}`; the response body is the
//! operation result.

use async_trait::async_trait;
use nimbus_application::ports::{ProviderClient, ProviderError};
use nimbus_domain::Value;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

#[derive(Serialize)]
struct ProviderRequest<'a> {
    service: &'a str,
    operation: &'a str,
    params: &'a Value,
    stage: Option<&'a str>,
    region: Option<&'a str>,
}

/// Provider client using reqwest.
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: Client,
    endpoint: Url,
}

impl HttpProviderClient {
    /// Creates a client for the gateway at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an absolute URL or the HTTP
    /// client cannot be created.
    pub fn new(endpoint: &str) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ProviderError::Request(format!("invalid provider endpoint '{endpoint}': {e}"))
        })?;

        let client = Client::builder()
            .user_agent(concat!("Nimbus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Creates a client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// The gateway URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn request(
        &self,
        service: &str,
        operation: &str,
        params: Value,
        stage: Option<&str>,
        region: Option<&str>,
    ) -> Result<Value, ProviderError> {
        debug!(service, operation, endpoint = %self.endpoint, "sending provider request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ProviderRequest {
                service,
                operation,
                params: &params,
                stage,
                region,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.trim();
            return Err(ProviderError::Request(if text.is_empty() {
                status.to_string()
            } else {
                text.to_string()
            }));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
