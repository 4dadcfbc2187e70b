//! Versioned resource manifest
//!
//! Maps logical resource paths to content checksums. A manifest is fixed
//! per build: shipping a new manifest is what makes a new worker version.
//! The key `"/"` aliases the root document resource.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Logical key of the root document resource
pub const ROOT_ALIAS: &str = "/";

/// The root document file a generated manifest aliases to `"/"`
const ROOT_DOCUMENT: &str = "index.html";

/// Mapping from logical resource path to content checksum.
///
/// Checksums are opaque strings; the synchronizer only ever compares them
/// for equality. Serialized as a plain JSON object, which is also the
/// on-disk format of the persisted manifest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest {
    entries: BTreeMap<String, String>,
}

impl ResourceManifest {
    /// Build a manifest from entries, validating the schema
    pub fn from_entries(entries: BTreeMap<String, String>) -> SyncResult<Self> {
        for (key, checksum) in &entries {
            if key.is_empty() {
                return Err(SyncError::ManifestSchema(
                    "empty resource path".to_string(),
                ));
            }
            if checksum.is_empty() {
                return Err(SyncError::ManifestSchema(format!(
                    "empty checksum for resource '{key}'"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a manifest from its JSON object form
    pub fn from_json(raw: &str) -> SyncResult<Self> {
        let entries: BTreeMap<String, String> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    /// Serialize to the JSON object form used for the manifest record
    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Load and validate a manifest from a JSON file
    pub async fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Err(SyncError::ManifestNotFound(path.to_path_buf()));
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::io(format!("reading manifest from {}", path.display()), e))?;
        Self::from_json(&raw).map_err(|e| SyncError::ManifestInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Checksum recorded for a logical key
    pub fn checksum(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the manifest covers a logical key
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All logical keys, in lexicographic order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of resources in the manifest
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a cached entry with this key survives an upgrade from `prior`.
    ///
    /// An entry is retained only when the key is still present in this
    /// manifest and its checksum is unchanged since the prior manifest.
    /// Everything else is stale or removed and must be dropped.
    pub fn retains(&self, key: &str, prior: &ResourceManifest) -> bool {
        match (self.entries.get(key), prior.entries.get(key)) {
            (Some(new), Some(old)) => new == old,
            _ => false,
        }
    }

    /// Generate a manifest by hashing every file under a deploy directory.
    ///
    /// Keys are `/`-separated paths relative to `dir`. Dot-files are
    /// skipped. When the directory contains the root document, its
    /// checksum is also recorded under the `"/"` alias.
    pub fn generate(dir: &Path) -> SyncResult<Self> {
        let mut entries = BTreeMap::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let read = fs::read_dir(&current)
                .map_err(|e| SyncError::io(format!("reading directory {}", current.display()), e))?;
            for item in read {
                let item =
                    item.map_err(|e| SyncError::io("reading directory entry".to_string(), e))?;
                let path = item.path();
                if path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'))
                {
                    continue;
                }
                if path.is_dir() {
                    pending.push(path);
                } else {
                    let key = relative_key(dir, &path)?;
                    let checksum = hash_file(&path)?;
                    debug!(key = %key, checksum = %checksum, "hashed resource");
                    entries.insert(key, checksum);
                }
            }
        }

        if let Some(root) = entries.get(ROOT_DOCUMENT).cloned() {
            entries.insert(ROOT_ALIAS.to_string(), root);
        }

        Self::from_entries(entries)
    }
}

/// Path of `file` relative to `base`, normalized to forward slashes
fn relative_key(base: &Path, file: &Path) -> SyncResult<String> {
    let relative = file.strip_prefix(base).map_err(|_| {
        SyncError::ManifestSchema(format!("{} escapes the deploy root", file.display()))
    })?;
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    Ok(parts.join("/"))
}

/// SHA-256 of the file contents, truncated to 128 bits of hex
fn hash_file(path: &Path) -> SyncResult<String> {
    let contents = fs::read(path)
        .map_err(|e| SyncError::io(format!("reading {} for hashing", path.display()), e))?;
    let digest = Sha256::digest(&contents);
    Ok(hex::encode(&digest[..16]))
}
