//! HTTP fetch layer for listings, catalogs and payloads.
//!
//! ### Request contract
//! - Absolute http(s) URLs only, fragments dropped
//! - Redirects followed (default limit: 5); the final URL is reported
//! - Non-success status is a `Network` error
//! - Connect, read and total timeouts bound every call
//! - Max body bytes: 20MB (configurable)

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};

pub use url::{UrlError, parse_location};

use banner_core::{AppConfig, Error};

/// Accept header for GitHub-style directory listings.
pub const ACCEPT_LISTING: &str = "application/vnd.github.v3+json";

/// Accept header for the named-API list.
pub const ACCEPT_CATALOG: &str = "application/json, text/plain;q=0.9, */*;q=0.5";

/// Accept header for wallpaper payloads.
pub const ACCEPT_ANY: &str = "*/*";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "banner/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Total request timeout (default: 20s)
    pub timeout: Duration,

    /// TCP/TLS connect timeout (default: 10s)
    pub connect_timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "banner/0.1".to_string(),
            max_bytes: 20 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
            connect_timeout: Duration::from_millis(10_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Anything that can perform a GET and hand back the body.
///
/// The pipeline and the directory listing are generic over this so tests
/// can substitute in-memory upstreams.
#[async_trait]
pub trait HttpSource: Send + Sync {
    async fn get(&self, url: &str, accept: &str) -> Result<FetchResponse, Error>;

    /// GET `url` and keep the response only if `claim` accepts its final URL.
    ///
    /// Returns `Ok(None)` when the claim is declined. Sources that can see
    /// the final URL before the body arrives should skip reading it.
    async fn get_claimed(
        &self, url: &str, accept: &str, claim: &(dyn for<'u> Fn(&'u Url) -> bool + Sync),
    ) -> Result<Option<FetchResponse>, Error> {
        let response = self.get(url, accept).await?;
        Ok(claim(&response.final_url).then_some(response))
    }
}

/// reqwest-backed HTTP client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Send the request and check status and declared length; the body is not read.
    async fn send(&self, url_str: &str, accept: &str) -> Result<(Url, reqwest::Response), Error> {
        let url = parse_location(url_str).map_err(|e| Error::InvalidInput(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| describe_transport_error(&url, &e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Network(format!("{} returned status {}", url, status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && exceeds_limit(len, self.config.max_bytes)
        {
            return Err(Error::Network(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        Ok((url, response))
    }

    async fn read(&self, url: Url, response: reqwest::Response, start: Instant) -> Result<FetchResponse, Error> {
        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(|e| describe_transport_error(&url, &e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::Network(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    pub async fn fetch(&self, url_str: &str, accept: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let (url, response) = self.send(url_str, accept).await?;
        self.read(url, response, start).await
    }

    /// Fetch a URL, but read the body only if `claim` accepts the final URL.
    ///
    /// A declined response is dropped with its body unread.
    pub async fn fetch_claimed(
        &self, url_str: &str, accept: &str, claim: &(dyn Fn(&Url) -> bool + Sync),
    ) -> Result<Option<FetchResponse>, Error> {
        let start = Instant::now();
        let (url, response) = self.send(url_str, accept).await?;

        if !claim(response.url()) {
            tracing::debug!("declined {} -> {} before reading body", url, response.url());
            return Ok(None);
        }

        self.read(url, response, start).await.map(Some)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Declared lengths beyond `usize` saturate instead of truncating.
fn exceeds_limit(len: u64, max_bytes: usize) -> bool {
    usize::try_from(len).unwrap_or(usize::MAX) > max_bytes
}

fn describe_transport_error(url: &Url, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("timed out fetching {}", url))
    } else {
        Error::Network(format!("network error fetching {}: {}", url, err))
    }
}

#[async_trait]
impl HttpSource for FetchClient {
    async fn get(&self, url: &str, accept: &str) -> Result<FetchResponse, Error> {
        self.fetch(url, accept).await
    }

    async fn get_claimed(
        &self, url: &str, accept: &str, claim: &(dyn for<'u> Fn(&'u Url) -> bool + Sync),
    ) -> Result<Option<FetchResponse>, Error> {
        self.fetch_claimed(url, accept, claim).await
    }
}
