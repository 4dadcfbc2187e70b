//! Sync, install and activate commands - the worker lifecycle phases

use crate::cli::commands::build_synchronizer;
use crate::config::Config;
use crate::error::SyncResult;
use crate::sync::CacheSynchronizer;
use console::style;
use indicatif::ProgressBar;
use std::time::Duration;

/// Execute the sync command: a full upgrade cycle
pub async fn sync(config: &Config) -> SyncResult<()> {
    let synchronizer = build_synchronizer(config).await?;
    run_install(&synchronizer).await?;
    run_activate(&synchronizer).await?;
    println!("{} Cache is in sync with the manifest", style("✓").green());
    Ok(())
}

/// Execute the install command
pub async fn install(config: &Config) -> SyncResult<()> {
    let synchronizer = build_synchronizer(config).await?;
    run_install(&synchronizer).await
}

/// Execute the activate command
pub async fn activate(config: &Config) -> SyncResult<()> {
    let synchronizer = build_synchronizer(config).await?;
    run_activate(&synchronizer).await
}

async fn run_install(synchronizer: &CacheSynchronizer) -> SyncResult<()> {
    let spinner = spinner(format!(
        "Staging {} shell resources...",
        synchronizer.shell().len()
    ));
    let result = synchronizer.install().await;
    spinner.finish_and_clear();
    result?;
    println!(
        "{} Staged {} shell resources",
        style("✓").green(),
        synchronizer.shell().len()
    );
    Ok(())
}

async fn run_activate(synchronizer: &CacheSynchronizer) -> SyncResult<()> {
    let spinner = spinner("Reconciling content partition...".to_string());
    let result = synchronizer.activate().await;
    spinner.finish_and_clear();
    result?;
    println!("{} Content partition activated", style("✓").green());
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
