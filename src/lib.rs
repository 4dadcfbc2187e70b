//! Shellsync - Offline App-Shell Cache Synchronizer
//!
//! Keeps a durable cache of application shell resources reconciled
//! against a versioned, build-time resource manifest: staged installs,
//! manifest-diffing activation, online-first/cache-first fetch
//! interception and on-demand full offline download.

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod net;
pub mod store;
pub mod sync;

pub use error::{SyncError, SyncResult};
