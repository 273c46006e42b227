use bytes::Bytes;
use reqwest::{Client, header::CONTENT_TYPE};
use std::time::Duration;

use super::headers::UpstreamHeaders;
use crate::{Error, Result};

/// What came back from the upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

/// HTTP client for fetching pages from the upstream origin.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch one upstream URL. Non-success statuses are failures.
    pub async fn fetch(&self, url: &str, headers: &UpstreamHeaders) -> Result<UpstreamResponse> {
        let request = headers.apply(self.client.get(url));

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        tracing::debug!("Fetched {} ({}, {})", url, status, content_type);

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body: response.bytes().await?,
        })
    }
}
