use crate::state::PageState;
use std::collections::HashSet;
use url::Url;

/// Mutable state of one crawl invocation
///
/// The dedup key is the absolute URL string exactly as discovered (scheme,
/// host, path, query and fragment), without further canonicalization.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    order: Vec<String>,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of `url` in this crawl
    pub fn page_state(&self, url: &Url) -> PageState {
        if self.visited.contains(url.as_str()) {
            PageState::Visited
        } else {
            PageState::Pending
        }
    }

    /// Marks `url` visited
    ///
    /// Returns false, and changes nothing, if it was already visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.page_state(url).can_transition_to(PageState::Visited) {
            return false;
        }

        self.visited.insert(url.to_string());
        self.order.push(url.to_string());
        true
    }

    /// Number of URLs visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Consumes the state, returning the visit order
    pub fn into_visit_order(self) -> Vec<String> {
        self.order
    }
}
