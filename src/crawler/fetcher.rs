//! HTTP fetcher implementation
//!
//! This module handles every authenticated request the walker makes:
//! - Building the HTTP client with timeouts and user agent
//! - The root collection fetch, which must succeed
//! - Link fetches, where any failure just means "absent"
//! - Streaming attachment downloads into the mirror

use crate::auth::AccessToken;
use crate::config::CrawlerConfig;
use crate::mirror::BinaryWriter;
use crate::{DownloadError, HarvestError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Result of a best-effort link fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The link resolved to a JSON document
    Found(Value),

    /// The link could not be resolved; the branch is pruned
    Absent {
        /// HTTP status, when a response was received at all
        status: Option<u16>,
        /// Human-readable cause for the log
        reason: String,
    },
}

/// Outcome of a completed attachment transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadResult {
    /// Final HTTP status
    pub status: u16,
    /// Bytes streamed into the destination
    pub bytes: u64,
}

/// The fetch operations the walker depends on
///
/// [`ResourceFetcher`] is the HTTP implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches the root collection; any failure is fatal to the run
    async fn fetch_required(&self, url: &str) -> Result<Value, HarvestError>;

    /// Fetches a linked resource; failures are reported as [`FetchOutcome::Absent`]
    async fn fetch_optional(&self, url: &str) -> FetchOutcome;

    /// Streams a binary payload into `dest`
    async fn download(
        &self,
        url: &str,
        dest: &mut BinaryWriter,
    ) -> Result<DownloadResult, DownloadError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use talent_harvest::config::CrawlerConfig;
/// use talent_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Bearer-authenticated fetcher over `reqwest`
#[derive(Debug, Clone)]
pub struct ResourceFetcher {
    client: Client,
    token: AccessToken,
    download_timeout: Option<Duration>,
}

impl ResourceFetcher {
    pub fn new(client: Client, token: AccessToken) -> Self {
        Self {
            client,
            token,
            download_timeout: None,
        }
    }

    /// Overrides the client's request timeout for attachment downloads
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = Some(timeout);
        self
    }

    fn get_json(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.token.bearer())
    }
}

#[async_trait]
impl Fetch for ResourceFetcher {
    async fn fetch_required(&self, url: &str) -> Result<Value, HarvestError> {
        let root_failure = |status: Option<u16>, body: String| HarvestError::RootFetch {
            url: url.to_string(),
            status,
            body,
        };

        let response = self
            .get_json(url)
            .send()
            .await
            .map_err(|e| root_failure(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| root_failure(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(root_failure(Some(status.as_u16()), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| root_failure(Some(status.as_u16()), format!("invalid JSON: {}", e)))
    }

    async fn fetch_optional(&self, url: &str) -> FetchOutcome {
        let response = match self.get_json(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                return FetchOutcome::Absent {
                    status: None,
                    reason,
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Absent {
                status: Some(status.as_u16()),
                reason: format!("HTTP {}", status.as_u16()),
            };
        }

        match response.json::<Value>().await {
            Ok(value) => FetchOutcome::Found(value),
            Err(e) => FetchOutcome::Absent {
                status: Some(status.as_u16()),
                reason: format!("unreadable body: {}", e),
            },
        }
    }

    async fn download(
        &self,
        url: &str,
        dest: &mut BinaryWriter,
    ) -> Result<DownloadResult, DownloadError> {
        let mut request = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.token.bearer());
        if let Some(timeout) = self.download_timeout {
            request = request.timeout(timeout);
        }

        let mut response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
            });
        }

        while let Some(chunk) = response.chunk().await? {
            dest.write_chunk(&chunk).await?;
        }

        Ok(DownloadResult {
            status: status.as_u16(),
            bytes: dest.bytes_written(),
        })
    }
}
