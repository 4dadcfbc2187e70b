//! Download command - full offline availability on demand

use crate::cli::commands::build_synchronizer;
use crate::config::Config;
use crate::error::SyncResult;
use console::style;
use indicatif::ProgressBar;
use std::time::Duration;

/// Execute the download command
pub async fn execute(config: &Config) -> SyncResult<()> {
    let synchronizer = build_synchronizer(config).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Checking {} manifest resources...",
        synchronizer.manifest().len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = synchronizer.download_offline().await;
    spinner.finish_and_clear();

    let downloaded = result?;
    if downloaded == 0 {
        println!("{} All manifest resources already cached", style("✓").green());
    } else {
        println!(
            "{} Downloaded {} resources; the app is fully available offline",
            style("✓").green(),
            downloaded
        );
    }
    Ok(())
}
