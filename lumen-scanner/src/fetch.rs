//! Page fetching capability used by the crawler.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Lumen/0.1 (accessibility auditor; https://github.com/trapdoorsec/lumen)";

/// A successfully fetched page body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative links on the page resolve against it.
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub response_time: Duration,
}

/// Retrieves the markup behind a URL.
///
/// Implementations report non-2xx answers as [`ScanError::HttpStatus`] so the
/// crawler can treat every failure the same way.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(5, DEFAULT_USER_AGENT)
    }

    pub fn with_timeout(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScanError::Timeout(url.to_string())
            } else {
                ScanError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            response_time: start.elapsed(),
        })
    }
}
