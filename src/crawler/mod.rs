//! Crawler module for page fetching and indexing
//!
//! This module contains the core crawling logic:
//! - Global request spacing shared by every fetch
//! - HTTP fetching and response classification
//! - The per-page document index and its queries
//! - Depth-first crawl driving

mod coordinator;
mod document;
mod fetcher;
mod limiter;

pub use coordinator::{run_crawl, CrawlLimits, CrawlReport, Crawler, PageVisitor};
pub use document::Document;
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use limiter::RateLimiter;
