//! In-memory cache store for tests and embedding hosts

use crate::error::SyncResult;
use crate::store::{CachedResource, CacheStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

type Partitions = BTreeMap<String, BTreeMap<String, CachedResource>>;

/// Cache store backed by nested in-memory maps.
///
/// Keys come back in lexicographic order, which keeps enumeration-driven
/// logic (activation, download-all) deterministic under test.
#[derive(Default)]
pub struct MemoryStore {
    partitions: Mutex<Partitions>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, partition: &str, key: &str) -> SyncResult<Option<CachedResource>> {
        let partitions = self.partitions.lock().await;
        Ok(partitions
            .get(partition)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, partition: &str, key: &str, resource: CachedResource) -> SyncResult<()> {
        let mut partitions = self.partitions.lock().await;
        partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), resource);
        Ok(())
    }

    async fn delete(&self, partition: &str, key: &str) -> SyncResult<bool> {
        let mut partitions = self.partitions.lock().await;
        Ok(partitions
            .get_mut(partition)
            .is_some_and(|entries| entries.remove(key).is_some()))
    }

    async fn keys(&self, partition: &str) -> SyncResult<Vec<String>> {
        let partitions = self.partitions.lock().await;
        Ok(partitions
            .get(partition)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn drop_partition(&self, partition: &str) -> SyncResult<()> {
        let mut partitions = self.partitions.lock().await;
        partitions.remove(partition);
        Ok(())
    }
}
