//! Crawl driver - depth-first traversal of one site
//!
//! The driver takes a seed URL and walks every same-site link reachable from
//! it, depth-first and in discovery order:
//! - a URL is marked visited before it is fetched, so it is never retried
//! - fetch failures abandon that branch of the frontier and nothing else
//! - each fetched page is indexed once and handed to the [`PageVisitor`]
//! - the page's links are then crawled in the order they were found
//!
//! The recursion is kept on an explicit stack of link lists; the visiting
//! order is the same as the recursive formulation.

use crate::config::Config;
use crate::crawler::document::Document;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::state::CrawlState;
use crate::url::Origin;
use crate::RumbleError;
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Receives every successfully fetched page
///
/// The driver does not observe what the visitor does with the page.
#[allow(async_fn_in_trait)]
pub trait PageVisitor {
    /// Called once per fetched page, before its links are crawled
    async fn visit(&mut self, url: &Url, document: &Document<'_>);
}

/// Optional bounds on a crawl; both are off unless configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Links found on pages at this depth are not followed
    pub max_depth: Option<u32>,

    /// No more pages are fetched once this many have been visited
    pub max_pages: Option<u32>,
}

/// Outcome of one crawl invocation
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// URLs visited, in the order they were taken (redirect targets included)
    pub visited: Vec<String>,

    /// Pages fetched, indexed and handed to the visitor
    pub pages_processed: u64,

    /// Pages whose fetch failed (network error or non-2xx)
    pub pages_failed: u64,

    /// Pages fetched but not parsed (not HTML, or redirected off-site or to
    /// an already visited page)
    pub pages_skipped: u64,

    /// Same-site links returned by processed pages, before dedup
    pub links_discovered: u64,

    /// The crawl stopped because its cancellation token fired
    pub cancelled: bool,

    /// The crawl stopped short because of a depth or page limit
    pub truncated: bool,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of URLs visited (successfully or not)
    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }
}

/// One level of the depth-first walk: the links of a page still to crawl
struct Frame {
    links: std::vec::IntoIter<Url>,
    depth: u32,
}

/// Crawl driver for a single site
pub struct Crawler {
    origin: Origin,
    fetcher: Arc<Fetcher>,
    limits: CrawlLimits,
    cancel: CancellationToken,
}

impl Crawler {
    /// Creates a crawler for `origin` that fetches through `fetcher`
    pub fn new(origin: Origin, fetcher: Arc<Fetcher>) -> Self {
        Self {
            origin,
            fetcher,
            limits: CrawlLimits::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a crawler from configuration, building its own fetcher
    pub fn from_config(config: &Config, origin: Origin) -> Result<Self, RumbleError> {
        let fetcher = Fetcher::from_config(&config.user_agent, &config.crawler)?;
        Ok(Self::new(origin, Arc::new(fetcher)).with_limits(CrawlLimits {
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages,
        }))
    }

    /// Sets depth/page limits
    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Uses `token` to stop the crawl from outside
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The origin links are resolved against and filtered by
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The shared fetcher, for visitors that issue their own requests
    pub fn fetcher(&self) -> Arc<Fetcher> {
        self.fetcher.clone()
    }

    /// Handle that cancels this crawl
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls the site starting from `seed`
    ///
    /// # Algorithm
    ///
    /// For each URL taken off the frontier:
    /// 1. Already visited → skip
    /// 2. Mark visited
    /// 3. Fetch through the rate limiter; on failure, log and move on
    /// 4. Build the [`Document`]
    /// 5. Hand it to `visitor`
    /// 6. Crawl its links, in discovery order, before the next sibling link
    ///
    /// Every crawl starts with a fresh [`CrawlState`]. Nothing inside the loop
    /// is fatal; the report is always returned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rumble_crawl::config::load_config;
    /// use rumble_crawl::crawler::{Crawler, Document, PageVisitor};
    /// use rumble_crawl::url::Origin;
    /// use std::path::Path;
    /// use url::Url;
    ///
    /// struct Titles(Vec<String>);
    ///
    /// impl PageVisitor for Titles {
    ///     async fn visit(&mut self, _url: &Url, document: &Document<'_>) {
    ///         self.0.push(document.title());
    ///     }
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("rumble.toml"))?;
    /// let seed = Url::parse("https://shop.example/")?;
    /// let crawler = Crawler::from_config(&config, Origin::from_url(&seed)?)?;
    ///
    /// let mut titles = Titles(Vec::new());
    /// let report = crawler.crawl(seed, &mut titles).await;
    /// println!("{} pages, titles: {:?}", report.pages_visited(), titles.0);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl<V: PageVisitor>(&self, seed: Url, visitor: &mut V) -> CrawlReport {
        let start_time = Instant::now();
        let mut state = CrawlState::new();
        let mut report = CrawlReport::default();

        tracing::info!("Crawling {} (origin {})", seed, self.origin);

        let mut stack = vec![Frame {
            links: vec![seed].into_iter(),
            depth: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(url) = frame.links.next() else {
                stack.pop();
                continue;
            };
            let depth = frame.depth;

            if self.cancel.is_cancelled() {
                tracing::warn!("Crawl cancelled after {} pages", state.visited_count());
                report.cancelled = true;
                break;
            }

            if state.page_state(&url).is_terminal() {
                tracing::trace!("Already visited {}", url);
                continue;
            }

            if let Some(max_pages) = self.limits.max_pages {
                if state.visited_count() >= max_pages as usize {
                    tracing::warn!("Page limit of {} reached, stopping crawl", max_pages);
                    report.truncated = true;
                    break;
                }
            }

            state.mark_visited(&url);

            tracing::debug!("Fetching {} (depth {})", url, depth);
            let Some(links) = self
                .process_page(&url, visitor, &mut state, &mut report)
                .await
            else {
                continue;
            };

            if let Some(max_depth) = self.limits.max_depth {
                if depth >= max_depth {
                    if !links.is_empty() {
                        tracing::debug!(
                            "Not following {} links from {}: depth limit {} reached",
                            links.len(),
                            url,
                            max_depth
                        );
                        report.truncated = true;
                    }
                    continue;
                }
            }

            stack.push(Frame {
                links: links.into_iter(),
                depth: depth + 1,
            });

            let visited = state.visited_count();
            if visited % 10 == 0 {
                let rate = visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} failed, {:.2} pages/sec",
                    visited,
                    report.pages_failed,
                    rate
                );
            }
        }

        report.visited = state.into_visit_order();
        report.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl finished: {} pages visited, {} processed, {} failed in {:?}",
            report.pages_visited(),
            report.pages_processed,
            report.pages_failed,
            report.elapsed
        );

        report
    }

    /// Fetches, indexes and visits one page
    ///
    /// Returns the page's same-site links, or None if the page could not be
    /// fetched or parsed.
    ///
    /// A redirect is followed only as far as the origin allows: a final URL
    /// on another host is never indexed, and a final URL on this host is
    /// marked visited so it is not fetched again when linked directly.
    async fn process_page<V: PageVisitor>(
        &self,
        url: &Url,
        visitor: &mut V,
        state: &mut CrawlState,
        report: &mut CrawlReport,
    ) -> Option<Vec<Url>> {
        let result = self.fetcher.fetch(url).await;

        if let FetchResult::Success { final_url, .. } = &result {
            if final_url != url {
                if !self.origin.same_host(final_url) {
                    tracing::info!("{} redirected off-site to {}, skipping", url, final_url);
                    report.pages_skipped += 1;
                    return None;
                }
                if !state.mark_visited(final_url) {
                    tracing::debug!("{} redirected to already visited {}", url, final_url);
                    report.pages_skipped += 1;
                    return None;
                }
                tracing::debug!("{} redirected to {}", url, final_url);
            }
        }

        if !result.is_html() {
            match result {
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("HTTP {} for {}, skipping", status_code, url);
                    report.pages_failed += 1;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to fetch {}: {}", url, error);
                    report.pages_failed += 1;
                }
                FetchResult::Success { content_type, .. } => {
                    tracing::debug!(
                        "Not parsing {}: content type {}",
                        url,
                        content_type.unwrap_or_default()
                    );
                    report.pages_skipped += 1;
                }
            }
            return None;
        }

        let FetchResult::Success { final_url, body, .. } = result else {
            return None;
        };

        let markup = String::from_utf8_lossy(&body);
        let html = Html::parse_document(&markup);
        if !html.errors.is_empty() {
            tracing::trace!("{} markup errors in {}", html.errors.len(), final_url);
        }

        let document = Document::parse(&html, &self.origin);
        visitor.visit(&final_url, &document).await;
        report.pages_processed += 1;

        let links = document.links();
        report.links_discovered += links.len() as u64;
        Some(links)
    }
}

/// Runs a crawl with configuration and a visitor
///
/// Convenience wrapper building the crawler from `config` for `seed`'s origin.
pub async fn run_crawl<V: PageVisitor>(
    config: &Config,
    seed: Url,
    visitor: &mut V,
) -> Result<CrawlReport, RumbleError> {
    let origin = Origin::from_url(&seed)?;
    let crawler = Crawler::from_config(config, origin)?;
    Ok(crawler.crawl(seed, visitor).await)
}
