//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Spacing every GET through the crawl's [`RateLimiter`]
//! - Classifying responses into success, HTTP error and network error

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::limiter::RateLimiter;
use crate::RumbleError;
use reqwest::{redirect::Policy, Client};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Content-Type header value, if present
        content_type: Option<String>,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Non-2xx response
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if the response can be parsed as markup
    ///
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match self {
            Self::Success { content_type, .. } => content_type
                .as_deref()
                .map_or(true, |ct| ct.to_ascii_lowercase().contains("html")),
            _ => false,
        }
    }

    /// Converts the result into the body bytes or an error
    pub fn into_body(self, url: &Url) -> Result<Vec<u8>, RumbleError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::HttpError { status_code } => Err(RumbleError::Status {
                url: url.to_string(),
                status_code,
            }),
            Self::NetworkError { error } => Err(RumbleError::Fetch {
                url: url.to_string(),
                message: error,
            }),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - The crawler configuration (request timeout)
///
/// # Example
///
/// ```no_run
/// use rumble_crawl::config::{CrawlerConfig, UserAgentConfig};
/// use rumble_crawl::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "RumbleCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
/// let crawler = CrawlerConfig {
///     min_request_interval: 1000,
///     request_timeout: 30,
///     max_depth: None,
///     max_pages: None,
/// };
///
/// let client = build_http_client(&user_agent, &crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited HTTP GET
///
/// Every request issued through a `Fetcher`, page or image, first waits on
/// the shared limiter.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    requests: AtomicU64,
}

impl Fetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(min_interval),
            requests: AtomicU64::new(0),
        }
    }

    /// Builds the client and limiter from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, RumbleError> {
        let client = build_http_client(user_agent, crawler)?;
        Ok(Self::new(
            client,
            Duration::from_millis(crawler.min_request_interval),
        ))
    }

    /// Waits for the limiter, then GETs `url`
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let waited = self.limiter.acquire().await;
        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Dispatching GET {} after {:?}", url, waited);

        fetch_url(&self.client, url.as_str()).await
    }

    /// Number of requests dispatched so far
    pub fn requests_made(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// The limiter every request goes through
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Fetches a URL without rate limiting and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` with body |
/// | Any other status | `HttpError` |
/// | Connect / timeout / body error | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
