use super::KvStore;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local store. Used by tests and `memory://` deployments.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all keys, for inspecting the persisted layout in tests.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>> {
        // entry() holds the shard lock, so check-and-insert is atomic
        let stored = self.entries.entry(key.to_string()).or_insert(value);
        Ok(stored.value().clone())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
