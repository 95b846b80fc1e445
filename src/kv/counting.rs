use super::{KvStore, MemoryKvStore};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory store that counts write calls (`set` and `set_if_absent`).
#[derive(Default)]
pub struct CountingKvStore {
    inner: MemoryKvStore,
    writes: AtomicUsize,
}

impl CountingKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl KvStore for CountingKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}
