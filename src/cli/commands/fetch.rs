//! Fetch command - run one request through fetch interception

use crate::cli::args::FetchArgs;
use crate::cli::commands::build_synchronizer;
use crate::config::Config;
use crate::error::SyncResult;
use crate::sync::{FetchOutcome, Request};
use console::style;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SyncResult<()> {
    let synchronizer = build_synchronizer(config).await?;
    let url = resolve_url(&args.path, &config.app.origin);

    match synchronizer.handle_fetch(&Request::get(&url)).await? {
        FetchOutcome::Passthrough => {
            println!(
                "{} {} is not a manifest resource; the request passes through",
                style("→").yellow(),
                url
            );
        }
        FetchOutcome::Response(response) => {
            println!(
                "{} HTTP {} {} ({} bytes{})",
                style("✓").green(),
                response.status,
                url,
                response.body.len(),
                response
                    .content_type
                    .as_deref()
                    .map(|ct| format!(", {ct}"))
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}

/// Expand a bare resource path against the configured origin
fn resolve_url(path: &str, origin: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    format!("{}/{}", origin, path.trim_start_matches('/'))
}
