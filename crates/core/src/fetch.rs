//! Article fetching over HTTP.
//!
//! The pipeline talks to the network through the [`Fetcher`] trait so tests
//! can substitute scripted responses. The production implementation is
//! [`HttpFetcher`] on reqwest. Both non-success status and transport failure
//! map to `Err`; the per-request timeout is enforced by the scheduler, which
//! races the fetch future against a timer and drops it on expiry.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{QsiftError, Result};

/// Default per-fetch deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// HTTP client configuration for fetching article pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request deadline in milliseconds, enforced by the scheduler.
    pub timeout_ms: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: "Mozilla/5.0 (compatible; Qsift/0.3; +https://github.com/stormlightlabs/qsift)"
                .to_string(),
        }
    }
}

/// Source of article markup.
///
/// Implementations must distinguish nothing for the caller: a non-2xx
/// answer and a transport failure are both `Err`, and both mean "leave the
/// item visible, retry on a later scan".
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Production fetcher over reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Builds a fetcher with a shared connection pool.
    ///
    /// No client-level timeout is set; cancellation is owned by the
    /// scheduler so the deadline covers queue-to-settle, not per-attempt.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder().build().map_err(QsiftError::Http)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| QsiftError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "text/html")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QsiftError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
