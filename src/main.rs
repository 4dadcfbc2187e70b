//! Shellsync - Offline app-shell cache synchronizer
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use shellsync::cli::{commands, Cli, Commands};
use shellsync::config::ConfigManager;
use shellsync::error::SyncResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SyncResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("shellsync=warn"),
        1 => EnvFilter::new("shellsync=info"),
        _ => EnvFilter::new("shellsync=debug"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Sync => commands::sync(&config).await,
        Commands::Install => commands::install(&config).await,
        Commands::Activate => commands::activate(&config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Download => commands::download(&config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Manifest(args) => commands::manifest(args, &config).await,
        Commands::Config(args) => commands::config(args, &manager, &config).await,
    }
}
