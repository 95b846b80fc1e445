//! Backing key-value store.
//!
//! The service keeps no authoritative state in memory; every secret and
//! settings record lives behind a [`KvStore`]. Backends guarantee atomic
//! single-key reads and writes, nothing more.

#[cfg(test)]
mod counting;
mod memory;
mod sqlite;

#[cfg(test)]
pub use counting::CountingKvStore;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable map from string keys to opaque bytes.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the value under `key` unconditionally.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Stores `value` only if `key` is vacant.
    ///
    /// Returns whichever value is stored once the call completes: `value`
    /// if it was inserted, otherwise the existing one.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

pub type SharedKvStore = Arc<dyn KvStore>;

/// Open a store from a connection URI.
///
/// Supported forms:
/// - `sqlite://<path>`: SQLite database file
/// - `sqlite::memory:`: private in-memory SQLite database
/// - `memory://`: process-local map (no persistence)
pub fn open(uri: &str) -> Result<SharedKvStore> {
    if uri == "memory://" {
        return Ok(Arc::new(MemoryKvStore::new()));
    }
    if uri == "sqlite::memory:" {
        return Ok(Arc::new(SqliteKvStore::new(":memory:")?));
    }
    if let Some(path) = uri.strip_prefix("sqlite://") {
        if path.is_empty() {
            return Err(anyhow!("Store URI '{}' is missing a database path", uri));
        }
        return Ok(Arc::new(SqliteKvStore::new(path)?));
    }
    Err(anyhow!(
        "Unsupported store URI '{}' (expected sqlite://<path>, sqlite::memory: or memory://)",
        uri
    ))
}
