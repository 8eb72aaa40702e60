//! URL handling module for Rumble-Crawl
//!
//! This module provides the crawl [`Origin`] and the normalization helpers the
//! document index uses to resolve link and image references against it.

mod normalize;

pub use normalize::{file_extension, is_crawlable, resolve_image_src, resolve_reference};

use crate::{UrlError, UrlResult};
use url::Url;

/// The scheme + host pair relative references are resolved against
///
/// The port is part of the host: `shop.example` and `shop.example:8080` are
/// different origins. Hosts are compared as exact strings, so subdomains never
/// match their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    base: Url,
}

impl Origin {
    /// Builds the origin of an absolute URL
    ///
    /// Only the scheme, host and port are kept; path, query and fragment of
    /// `url` are discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use rumble_crawl::url::Origin;
    /// use url::Url;
    ///
    /// let origin = Origin::from_url(&Url::parse("http://shop.example/p/1?x=2").unwrap()).unwrap();
    /// assert_eq!(origin.scheme(), "http");
    /// assert_eq!(origin.host(), "shop.example");
    /// assert_eq!(origin.as_url().as_str(), "http://shop.example/");
    /// ```
    pub fn from_url(url: &Url) -> UrlResult<Self> {
        if url.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        let mut base = url.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        // Credentials never become part of resolved links
        let _ = base.set_username("");
        let _ = base.set_password(None);

        Ok(Self { base })
    }

    /// Parses a seed URL string and builds its origin
    ///
    /// The seed must be an absolute http(s) URL.
    pub fn parse(seed: &str) -> UrlResult<Self> {
        let url = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        Self::from_url(&url)
    }

    /// The origin's scheme
    pub fn scheme(&self) -> &str {
        self.base.scheme()
    }

    /// The origin's host, without port
    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// The origin's explicit port, if any
    pub fn port(&self) -> Option<u16> {
        self.base.port()
    }

    /// The origin as a URL with an empty (`/`) path
    pub fn as_url(&self) -> &Url {
        &self.base
    }

    /// Returns true if `url` has exactly this origin's host and port
    pub fn same_host(&self, url: &Url) -> bool {
        url.host_str() == self.base.host_str() && url.port() == self.base.port()
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port() {
            Some(port) => write!(f, "{}://{}:{}", self.scheme(), self.host(), port),
            None => write!(f, "{}://{}", self.scheme(), self.host()),
        }
    }
}
