//! Bucket API transport
//!
//! One call here is one HTTP request. Retrying is the caller's business:
//! every failure comes back as a [`TransportError`] and nothing is retried
//! in this module.

use crate::config::ApiConfig;
use crate::{TransportError, TransportResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Envelope returned by `api.php?action=bucket`
///
/// Records are kept as raw JSON; turning them into something typed is
/// up to the source that asked for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketResponse {
    /// The query string as the server understood it
    #[serde(rename = "bucketQuery")]
    pub bucket_query: String,

    /// Result rows
    pub bucket: Vec<serde_json::Value>,
}

/// Something that can execute a Bucket query
pub trait BucketTransport {
    /// Executes `query` and returns the decoded envelope
    fn fetch(
        &self,
        query: &str,
    ) -> impl Future<Output = TransportResult<BucketResponse>> + Send;
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Arguments
///
/// * `config` - The endpoint configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`BucketTransport`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds a transport from endpoint configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `query`, with the query string URL-encoded
    pub fn request_url(&self, query: &str) -> TransportResult<Url> {
        Url::parse_with_params(
            &self.base_url,
            &[("action", "bucket"), ("format", "json"), ("query", query)],
        )
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

impl BucketTransport for HttpTransport {
    async fn fetch(&self, query: &str) -> TransportResult<BucketResponse> {
        let url = self.request_url(query)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(TransportError::Envelope)
    }
}
