//! Cache partition storage
//!
//! Partitions are named key-value stores of request URL to cached
//! resource. The synchronizer addresses three of them (staging, content,
//! manifest record) but the store itself is role-agnostic.
//!
//! Implementations guarantee per-entry atomic put/delete; there are no
//! cross-entry transactions. Partitions are created lazily on first put
//! and reads against a missing partition behave as reads against an
//! empty one.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::error::SyncResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A cached response body with its transfer metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    /// Response body bytes
    pub body: Vec<u8>,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header, when the origin sent one
    pub content_type: Option<String>,
    /// When the resource was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedResource {
    /// Create a resource from a fetched response
    pub fn new(body: Vec<u8>, status: u16, content_type: Option<String>) -> Self {
        Self {
            body,
            status,
            content_type,
            fetched_at: Utc::now(),
        }
    }

    /// Create a synthetic JSON entry (the manifest record format)
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(body.into(), 200, Some("application/json".to_string()))
    }

    /// Whether the response carried a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, for JSON-bearing synthetic entries
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Abstract cache partition storage
///
/// Mirrors the platform cache-storage guarantees the protocol relies on:
/// atomic per-entry operations and whole-partition teardown.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up an entry by request URL
    async fn get(&self, partition: &str, key: &str) -> SyncResult<Option<CachedResource>>;

    /// Insert or replace an entry
    async fn put(&self, partition: &str, key: &str, resource: CachedResource) -> SyncResult<()>;

    /// Remove an entry; returns whether it existed
    async fn delete(&self, partition: &str, key: &str) -> SyncResult<bool>;

    /// All request URLs currently stored in a partition
    async fn keys(&self, partition: &str) -> SyncResult<Vec<String>>;

    /// Discard a partition and everything in it
    async fn drop_partition(&self, partition: &str) -> SyncResult<()>;
}
