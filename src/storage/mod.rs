//! Storage module for persisting products and images
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Product upserts and image attachment
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ProductStore, RunTotals, StorageError, StorageResult};

/// Represents a product in the database
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub updated_at: String,
}

/// A product together with the ids of its mirrored images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub id: String,
    pub title: String,
    pub image_ids: Vec<String>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: RunStatus,
    pub pages_visited: u64,
    pub products_found: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    /// Final status of a run that has stopped
    ///
    /// A cancelled run is interrupted even if it also hit store errors; a run
    /// that lost any product write is failed.
    pub fn for_outcome(cancelled: bool, store_errors: u64) -> Self {
        if cancelled {
            Self::Interrupted
        } else if store_errors > 0 {
            Self::Failed
        } else {
            Self::Completed
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Interrupted,
            RunStatus::Failed,
        ] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_for_outcome() {
        assert_eq!(RunStatus::for_outcome(false, 0), RunStatus::Completed);
        assert_eq!(RunStatus::for_outcome(false, 2), RunStatus::Failed);
        assert_eq!(RunStatus::for_outcome(true, 0), RunStatus::Interrupted);
        assert_eq!(RunStatus::for_outcome(true, 1), RunStatus::Interrupted);
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }
}
