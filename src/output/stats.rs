//! Statistics generation from the product database
//!
//! This module provides functionality for extracting and displaying
//! catalogue statistics from the storage layer.

use crate::storage::{ProductStore, RunRecord};
use crate::RumbleError;

/// Catalogue statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of products recorded
    pub total_products: u64,

    /// Number of mirrored images recorded
    pub total_images: u64,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Average number of images per product
    pub fn images_per_product(&self) -> f64 {
        if self.total_products == 0 {
            0.0
        } else {
            self.total_images as f64 / self.total_products as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(RumbleError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn ProductStore) -> Result<CrawlStatistics, RumbleError> {
    Ok(CrawlStatistics {
        total_products: storage.count_products()?,
        total_images: storage.count_images()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Catalogue Statistics ===\n");

    println!("Overview:");
    println!("  Products: {}", stats.total_products);
    println!("  Mirrored images: {}", stats.total_images);
    println!("  Images per product: {:.1}", stats.images_per_product());
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Seed: {}", run.seed_url);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Pages visited: {}", run.pages_visited);
            println!("  Products found: {}", run.products_found);
        }
        None => println!("No crawl runs recorded yet."),
    }
}
