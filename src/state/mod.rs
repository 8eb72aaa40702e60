//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: where a single URL stands within one crawl (pending or visited)
//! - `CrawlState`: the per-crawl dedup set every discovered URL is checked against

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;
