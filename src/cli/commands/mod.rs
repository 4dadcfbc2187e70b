//! CLI command implementations

pub mod config;
pub mod download;
pub mod fetch;
pub mod manifest;
pub mod status;
pub mod sync;

pub use config::execute as config;
pub use download::execute as download;
pub use fetch::execute as fetch;
pub use manifest::execute as manifest;
pub use status::execute as status;
pub use sync::{activate, install, sync};

use crate::config::{Config, ConfigManager};
use crate::error::SyncResult;
use crate::manifest::ResourceManifest;
use crate::net::HttpFetcher;
use crate::store::DiskStore;
use crate::sync::{CacheSynchronizer, NullHost, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Store root from config, falling back to the platform state dir
pub(crate) fn store_root(config: &Config) -> PathBuf {
    config
        .store
        .root
        .clone()
        .unwrap_or_else(ConfigManager::store_dir)
}

/// Assemble a synchronizer over the disk store and the live network
pub(crate) async fn build_synchronizer(config: &Config) -> SyncResult<CacheSynchronizer> {
    let manifest = ResourceManifest::load(&config.app.manifest).await?;

    let mut sync_config = SyncConfig::new(config.app.origin.clone(), config.app.shell.clone());
    sync_config.partitions = config.partition_names();

    Ok(CacheSynchronizer::new(
        manifest,
        sync_config,
        Arc::new(DiskStore::new(store_root(config))),
        Arc::new(HttpFetcher::new()),
        Arc::new(NullHost),
    ))
}
