//! SQLite-backed key-value store.
//!
//! One row per key. Each operation is a single statement, which gives the
//! per-key atomicity the rest of the service relies on. Calls run on the
//! blocking thread pool so request tasks never wait on disk I/O.

use super::KvStore;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Key-value store persisted in a single SQLite table.
///
/// # Schema
/// ```sql
/// CREATE TABLE kv (
///     key        TEXT PRIMARY KEY,
///     value      BLOB NOT NULL,
///     updated_at TEXT NOT NULL   -- ISO 8601 timestamp
/// );
/// ```
pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKvStore {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open store DB at {}", db_path))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      BLOB NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .context("Failed to create kv table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| anyhow!("Store connection mutex poisoned"))?;
            f(&guard)
        })
        .await
        .context("Store task panicked")?
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .context("Failed to read key")
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .context("Failed to write key")?;
            Ok(())
        })
        .await
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            // Both statements run under the same connection lock.
            conn.execute(
                "INSERT OR IGNORE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .context("Failed to insert key")?;
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .context("Failed to read back inserted key")
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .context("Failed to delete key")?;
            Ok(())
        })
        .await
    }
}
