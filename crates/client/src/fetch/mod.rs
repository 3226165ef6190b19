//! Versioned fetcher for remotely hosted hotfix resources.
//!
//! ### Resolution
//! - Every resource is a relative path joined onto a fixed base URL
//!   (default: `https://refined-github.github.io/yolo/`).
//!
//! ### Caching
//! - Transport-level caching is disabled on every request; freshness is decided
//!   by the cached functions in `hotfix-core`.
//!
//! ### Outcomes
//! - `404`/`410`: the resource is not defined, `Ok(None)`
//! - other non-success statuses and transport failures: errors
//! - Max body bytes: 5MB (configurable)

pub mod url;

use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize_base, resolve_resource_url};

use hotfix_core::{AppConfig, Error};

/// A source of hotfix resources addressed by relative path.
#[async_trait::async_trait]
pub trait ResourceSource: Send + Sync {
    /// Fetch the text of `path`, or `None` when the resource does not exist.
    async fn fetch_text(&self, path: &str) -> Result<Option<String>, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL resources are resolved against
    pub base_url: String,

    /// User agent string (default: "hotfix/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://refined-github.github.io/yolo/".to_string(),
            user_agent: "hotfix/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
        }
    }
}

/// HTTP client for hotfix resources with transport caching disabled.
pub struct HotfixFetcher {
    http: Client,
    base: reqwest::Url,
    config: FetchConfig,
}

impl HotfixFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let base = canonicalize_base(&config.base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base, config })
    }

    /// Base URL resources are resolved against.
    pub fn base(&self) -> &reqwest::Url {
        &self.base
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::HttpError(format!("network error: {}", err)) }
}

#[async_trait::async_trait]
impl ResourceSource for HotfixFetcher {
    async fn fetch_text(&self, path: &str) -> Result<Option<String>, Error> {
        let start = Instant::now();
        let url = resolve_resource_url(&self.base, path).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::CACHE_CONTROL, "no-cache, no-store")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            tracing::debug!("no hotfix defined at {} ({})", url, status.as_u16());
            return Ok(None);
        }

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {}", status.as_u16(), url)));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::ParseFailed(format!("{} is not valid UTF-8: {}", url, e)))?;

        tracing::debug!(
            "fetched {} in {}ms ({} bytes)",
            url,
            start.elapsed().as_millis(),
            text.len()
        );

        Ok(Some(text))
    }
}
