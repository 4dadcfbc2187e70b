//! On-disk cache store
//!
//! Partitions are directories under a root; each entry is a body file
//! plus a JSON sidecar with the request URL and transfer metadata. File
//! stems are derived from a digest of the request URL so arbitrary URLs
//! never touch filesystem naming rules.
//!
//! Writes go through a temp file and a rename, so an interrupted put
//! leaves either the old entry or the new one, never a torn body. The
//! sidecar is renamed last: an orphaned body file is invisible to
//! `keys()` and harmless.

use crate::error::{SyncError, SyncResult};
use crate::store::{CachedResource, CacheStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Sidecar metadata persisted next to each entry body
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    status: u16,
    content_type: Option<String>,
    fetched_at: DateTime<Utc>,
}

/// Cache store persisting partitions as directories of entry files
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at `root`; directories are created lazily
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory the store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    /// Digest-derived file stem for a request URL
    fn entry_stem(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        hex::encode(&digest[..8])
    }

    fn body_path(&self, partition: &str, key: &str) -> PathBuf {
        self.partition_dir(partition)
            .join(format!("{}.bin", Self::entry_stem(key)))
    }

    fn meta_path(&self, partition: &str, key: &str) -> PathBuf {
        self.partition_dir(partition)
            .join(format!("{}.json", Self::entry_stem(key)))
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> SyncResult<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents)
            .await
            .map_err(|e| SyncError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| SyncError::io(format!("renaming into {}", path.display()), e))
    }

    async fn remove_if_present(path: &Path) -> SyncResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SyncError::io(format!("removing {}", path.display()), e)),
        }
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, partition: &str, key: &str) -> SyncResult<Option<CachedResource>> {
        let meta_raw = match fs::read(self.meta_path(partition, key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::io(format!("reading entry meta for {key}"), e)),
        };
        let meta: EntryMeta = serde_json::from_slice(&meta_raw)?;
        let body = fs::read(self.body_path(partition, key))
            .await
            .map_err(|e| SyncError::io(format!("reading entry body for {key}"), e))?;

        Ok(Some(CachedResource {
            body,
            status: meta.status,
            content_type: meta.content_type,
            fetched_at: meta.fetched_at,
        }))
    }

    async fn put(&self, partition: &str, key: &str, resource: CachedResource) -> SyncResult<()> {
        let dir = self.partition_dir(partition);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SyncError::io(format!("creating partition {}", dir.display()), e))?;

        let meta = EntryMeta {
            key: key.to_string(),
            status: resource.status,
            content_type: resource.content_type.clone(),
            fetched_at: resource.fetched_at,
        };

        Self::write_atomic(&self.body_path(partition, key), &resource.body).await?;
        Self::write_atomic(&self.meta_path(partition, key), &serde_json::to_vec(&meta)?).await?;
        debug!(partition, key, "stored cache entry");
        Ok(())
    }

    async fn delete(&self, partition: &str, key: &str) -> SyncResult<bool> {
        let existed = Self::remove_if_present(&self.meta_path(partition, key)).await?;
        Self::remove_if_present(&self.body_path(partition, key)).await?;
        Ok(existed)
    }

    async fn keys(&self, partition: &str) -> SyncResult<Vec<String>> {
        let dir = self.partition_dir(partition);
        let mut read = match fs::read_dir(&dir).await {
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SyncError::io(format!("listing {}", dir.display()), e)),
        };

        let mut keys = Vec::new();
        while let Some(item) = read
            .next_entry()
            .await
            .map_err(|e| SyncError::io(format!("listing {}", dir.display()), e))?
        {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read(&path)
                .await
                .map_err(|e| SyncError::io(format!("reading {}", path.display()), e))?;
            let meta: EntryMeta = serde_json::from_slice(&raw)?;
            keys.push(meta.key);
        }

        keys.sort();
        Ok(keys)
    }

    async fn drop_partition(&self, partition: &str) -> SyncResult<()> {
        let dir = self.partition_dir(partition);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::PartitionDrop {
                name: partition.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
