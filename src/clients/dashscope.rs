pub mod models;

use crate::core::{CompletionTransport, TransportResponse};
use crate::error::ApiError;
use async_trait::async_trait;
use models::CompletionRequest;
use reqwest::{Client, Url};
use tracing::{debug, error, instrument};

/// Transport that talks to the hosted application-completion API over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct DashScopeTransport {
    client: Client,
}

impl DashScopeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured `reqwest::Client` (proxy, custom timeout, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionTransport for DashScopeTransport {
    #[instrument(skip_all, fields(path = %url.path()))]
    async fn post(&self, url: &Url, api_key: &str, body: &CompletionRequest) -> Result<TransportResponse, ApiError> {
        debug!("Sending completion request");
        let response = self
            .client
            .post(url.clone())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ApiError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        debug!(status, "Received completion response");

        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read response body");
            ApiError::Network(e.to_string())
        })?;

        Ok(TransportResponse { status, body })
    }
}
