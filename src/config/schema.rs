//! Configuration schema for Shellsync
//!
//! Configuration is stored at `~/.config/shellsync/config.toml`

use crate::sync::PartitionNames;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Application shell settings
    pub app: AppConfig,

    /// Cache partition names
    pub partitions: PartitionsConfig,

    /// On-disk store settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Application shell and origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin the manifest resources resolve against
    pub origin: String,

    /// Path to the JSON resource manifest
    pub manifest: PathBuf,

    /// Core shell set, in fetch order
    pub shell: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".to_string(),
            manifest: PathBuf::from("shell-manifest.json"),
            shell: vec![
                "index.html".to_string(),
                "main.js".to_string(),
                "manifest.json".to_string(),
            ],
        }
    }
}

/// Cache partition naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionsConfig {
    /// Staging partition name
    pub staging: String,

    /// Durable content partition name
    pub content: String,

    /// Manifest record partition name
    pub manifest: String,
}

impl Default for PartitionsConfig {
    fn default() -> Self {
        let names = PartitionNames::default();
        Self {
            staging: names.staging,
            content: names.content,
            manifest: names.manifest,
        }
    }
}

/// On-disk store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root directory; defaults to the platform state dir
    pub root: Option<PathBuf>,
}

impl Config {
    /// Partition names in the form the synchronizer takes
    pub fn partition_names(&self) -> PartitionNames {
        PartitionNames {
            staging: self.partitions.staging.clone(),
            content: self.partitions.content.clone(),
            manifest: self.partitions.manifest.clone(),
        }
    }
}
