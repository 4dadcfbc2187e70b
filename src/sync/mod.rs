//! Offline-cache synchronization protocol
//!
//! One worker version carries one manifest; the synchronizer moves the
//! cache partitions from the previously applied manifest to the embedded
//! one across install and activate, then answers intercepted fetches
//! from the durable content partition.
//!
//! # Partition roles
//!
//! | Partition | Role |
//! |-----------|------|
//! | staging   | shell files fetched during install |
//! | content   | durable entries served to clients |
//! | manifest  | single record of the last-applied manifest |

pub mod key;
pub mod worker;

pub use worker::{
    CacheSynchronizer, ControlMessage, FetchOutcome, HostControl, NullHost, PartitionNames,
    Request, SyncConfig, MANIFEST_RECORD_KEY,
};
