//! Error types for Shellsync
//!
//! All modules use `SyncResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Shellsync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// All errors that can occur in Shellsync
#[derive(Error, Debug)]
pub enum SyncError {
    // Manifest errors
    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Invalid manifest: {0}")]
    ManifestSchema(String),

    // Store errors
    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Failed to drop cache partition {name}: {reason}")]
    PartitionDrop { name: String, reason: String },

    // Network errors
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SyncError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store error
    pub fn store(context: impl Into<String>) -> Self {
        Self::Store(context.into())
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound(_) => Some("Run: shellsync manifest <dir> to generate one"),
            Self::ConfigInvalid { .. } => Some("Check the config with: shellsync config show"),
            _ => None,
        }
    }
}
