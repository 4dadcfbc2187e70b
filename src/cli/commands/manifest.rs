//! Manifest command - hash a deploy directory into a resource manifest

use crate::cli::args::ManifestArgs;
use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::manifest::ResourceManifest;
use console::style;
use tokio::fs;

/// Execute the manifest command
pub async fn execute(args: ManifestArgs, config: &Config) -> SyncResult<()> {
    let manifest = ResourceManifest::generate(&args.dir)?;
    let output = args.output.unwrap_or_else(|| config.app.manifest.clone());

    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&output, json)
        .await
        .map_err(|e| SyncError::io(format!("writing manifest to {}", output.display()), e))?;

    println!(
        "{} Wrote {} resource checksums to {}",
        style("✓").green(),
        manifest.len(),
        output.display()
    );
    Ok(())
}
