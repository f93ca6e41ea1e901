//! HTTP transport for sitemap and robots.txt retrieval.
//!
//! A `HttpClient` owns one explicitly configured `reqwest::Client`. Responses
//! declaring `Content-Encoding: gzip` are decompressed by the transport before
//! the body is read, so callers always receive decoded text.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while retrieving a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body read failure.
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The body could not be decompressed or is not valid text.
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    /// The URL that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Decode { url, .. } => url,
        }
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: Box::new(err),
            }
        }
    }
}

/// Anything that can turn a URL into a text body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout, including reading the body.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("sitewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Time-bounded HTTP client with transparent gzip decoding.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET a URL and return its body as UTF-8 text.
    ///
    /// The status code is not inspected beyond logging; error pages are
    /// returned like any other body.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "fetch returned non-success status");
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(%url, bytes = bytes.len(), "fetched document");

        String::from_utf8(bytes.to_vec()).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}
