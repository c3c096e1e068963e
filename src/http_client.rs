use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::FetchError;

/// HTTP client for the WeChat public-platform API
///
/// Performs exactly one request per call. Retrying is left to the refresh loops.
#[derive(Clone, Debug)]
pub struct WeixinHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Scheme and host of the API, without trailing slash
    api_base: String,
}

impl WeixinHttpClient {
    /// Create a new HTTP client
    pub fn new(api_base: &str, connect_timeout: u64, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL every request path is appended to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// GET `url` and decode the JSON body into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            tracing::warn!(
                error = %e,
                connect = e.is_connect(),
                timeout = e.is_timeout(),
                "HTTP request error"
            );
            FetchError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!(status = %status, "Received HTTP response");

        // Query strings carry secrets, keep them out of error messages.
        let response = response
            .error_for_status()
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        Ok(serde_json::from_str(&body)?)
    }
}
