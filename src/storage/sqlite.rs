//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore trait.

use crate::mirror::MirroredImage;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProductStore, RunTotals, StorageError, StorageResult};
use crate::storage::{ProductListing, ProductRecord, RunRecord, RunStatus};
use crate::RumbleError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, seed_url, config_hash, started_at, finished_at, status, \
                           pages_visited, products_found";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(RumbleError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, RumbleError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, RumbleError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        config_hash: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        pages_visited: row.get::<_, i64>(6)? as u64,
        products_found: row.get::<_, i64>(7)? as u64,
    })
}

impl ProductStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (seed_url, config_hash, started_at, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed_url, config_hash, now, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3, products_found = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                totals.pages_visited as i64,
                totals.products_found as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Products =====

    fn upsert_product(&mut self, id: &str, url: &str, title: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO products (id, url, o_title, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET o_title = excluded.o_title, updated_at = excluded.updated_at",
            params![id, url, title, now],
        )?;
        Ok(())
    }

    fn insert_images(
        &mut self,
        product_id: &str,
        images: &[MirroredImage],
    ) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO images (id, pid, source_url, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING",
            )?;
            for image in images {
                inserted += stmt.execute(params![image.id, product_id, image.source_url, now])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn get_product(&self, id: &str) -> StorageResult<Option<ProductRecord>> {
        let product = self
            .conn
            .query_row(
                "SELECT id, url, o_title, updated_at FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ProductRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(product)
    }

    fn list_products(&self) -> StorageResult<Vec<ProductListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.o_title, i.id
             FROM products p LEFT JOIN images i ON i.pid = p.id
             ORDER BY p.o_title, p.id, i.created_at, i.id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut listings: Vec<ProductListing> = Vec::new();
        for row in rows {
            let (id, title, image_id) = row?;

            if listings.last().map_or(true, |last| last.id != id) {
                listings.push(ProductListing {
                    id,
                    title,
                    image_ids: Vec::new(),
                });
            }

            if let (Some(image_id), Some(listing)) = (image_id, listings.last_mut()) {
                listing.image_ids.push(image_id);
            }
        }

        Ok(listings)
    }

    // ===== Statistics =====

    fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_images(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
