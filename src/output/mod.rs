//! Output module for crawl reports and catalogue listings
//!
//! This module handles:
//! - Printing the report of a finished crawl
//! - Listing stored products with their mirrored image references
//! - Catalogue statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;
use crate::mirror::ImageMirror;
use crate::product::VisitStats;
use crate::storage::ProductListing;
use std::fmt::Write;

/// Renders products and their image references, one product per block
pub fn render_products<M: ImageMirror>(listings: &[ProductListing], mirror: &M) -> String {
    let mut out = String::new();

    for listing in listings {
        let _ = writeln!(out, "{}  {}", listing.id, listing.title);
        for image_id in &listing.image_ids {
            let _ = writeln!(out, "    {}", mirror.reference(image_id));
        }
    }

    out
}

/// Prints every product with its mirrored image references
pub fn print_products<M: ImageMirror>(listings: &[ProductListing], mirror: &M) {
    if listings.is_empty() {
        println!("No products recorded yet.");
        return;
    }

    print!("{}", render_products(listings, mirror));
    println!("\n{} products", listings.len());
}

/// Prints the report of a finished crawl
pub fn print_report(report: &CrawlReport, visits: &VisitStats) {
    println!("=== Crawl Report ===\n");

    println!("Pages:");
    println!("  Visited: {}", report.pages_visited());
    println!("  Processed: {}", report.pages_processed);
    println!("  Failed: {}", report.pages_failed);
    println!("  Skipped: {}", report.pages_skipped);
    println!("  Links discovered: {}", report.links_discovered);
    println!();

    println!("Products:");
    println!("  Added: {}", visits.products_added);
    println!("  Non-product pages: {}", visits.pages_skipped);
    println!("  Images mirrored: {}", visits.images_mirrored);
    println!("  Images failed: {}", visits.images_failed);
    if visits.store_errors > 0 {
        println!("  Store errors: {}", visits.store_errors);
    }
    println!();

    if report.cancelled {
        println!("Crawl was cancelled before the frontier was exhausted.");
    } else if report.truncated {
        println!("Crawl stopped at a configured depth or page limit.");
    }
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}
