//! Storage traits and error types
//!
//! This module defines the trait interface for product storage backends and
//! associated error types.

use crate::mirror::MirroredImage;
use crate::storage::{ProductListing, ProductRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub pages_visited: u64,
    pub products_found: u64,
}

/// Trait for product storage implementations
///
/// Products are keyed by an id derived from their page URL; images by the
/// content hash of their bytes.
pub trait ProductStore {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The URL the crawl starts from
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the final status and counts of a run with a finish timestamp
    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: RunTotals,
    ) -> StorageResult<()>;

    // ===== Products =====

    /// Inserts a product, or replaces the title of an existing one
    fn upsert_product(&mut self, id: &str, url: &str, title: &str) -> StorageResult<()>;

    /// Attaches mirrored images to a product
    ///
    /// Images whose id is already stored are left untouched.
    ///
    /// # Returns
    ///
    /// The number of image rows actually inserted
    fn insert_images(&mut self, product_id: &str, images: &[MirroredImage])
        -> StorageResult<usize>;

    /// Gets a product by id
    fn get_product(&self, id: &str) -> StorageResult<Option<ProductRecord>>;

    /// Lists every product with its image ids, ordered by title
    fn list_products(&self) -> StorageResult<Vec<ProductListing>>;

    // ===== Statistics =====

    /// Number of stored products
    fn count_products(&self) -> StorageResult<u64>;

    /// Number of stored images
    fn count_images(&self) -> StorageResult<u64>;
}
