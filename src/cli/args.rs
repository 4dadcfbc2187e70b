//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shellsync - Offline app-shell cache synchronizer
///
/// Keeps a durable cache of application shell resources reconciled
/// against a versioned resource manifest.
#[derive(Parser, Debug)]
#[command(name = "shellsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SHELLSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full upgrade cycle (install, then activate)
    Sync,

    /// Fetch the core shell set into the staging partition
    Install,

    /// Reconcile the content partition against the manifest record
    Activate,

    /// Run one request through fetch interception
    Fetch(FetchArgs),

    /// Download every manifest resource not yet cached
    Download,

    /// Show cache partitions and their entries
    Status(StatusArgs),

    /// Generate a resource manifest from a deploy directory
    Manifest(ManifestArgs),

    /// Show or locate configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Resource path (relative to the configured origin) or absolute URL
    pub path: String,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the manifest command
#[derive(Parser, Debug)]
pub struct ManifestArgs {
    /// Deploy directory to hash
    pub dir: PathBuf,

    /// Output path (defaults to the configured manifest path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config action
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Machine-readable JSON
    Json,
}
