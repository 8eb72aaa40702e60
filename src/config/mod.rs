//! Configuration module for Rumble-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use rumble_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rumble.toml")).unwrap();
//! println!("Request interval: {}ms", config.crawler.min_request_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, MirrorConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
