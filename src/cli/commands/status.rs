//! Status command - inspect cache partitions

use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::commands::store_root;
use crate::config::Config;
use crate::error::SyncResult;
use crate::store::{CacheStore, DiskStore};
use console::style;

/// One listed cache entry
#[derive(serde::Serialize)]
struct EntryRow {
    partition: String,
    key: String,
    status: u16,
    bytes: usize,
    fetched_at: String,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> SyncResult<()> {
    let store = DiskStore::new(store_root(config));
    let names = config.partition_names();

    let mut rows = Vec::new();
    for partition in [&names.staging, &names.content, &names.manifest] {
        for key in store.keys(partition).await? {
            if let Some(entry) = store.get(partition, &key).await? {
                rows.push(EntryRow {
                    partition: partition.clone(),
                    key,
                    status: entry.status,
                    bytes: entry.body.len(),
                    fetched_at: entry.fetched_at.format("%Y-%m-%d %H:%M").to_string(),
                });
            }
        }
    }

    match args.format {
        OutputFormat::Table => print_table(&rows, &store),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

fn print_table(rows: &[EntryRow], store: &DiskStore) {
    if rows.is_empty() {
        println!("No cache entries under {}", store.root().display());
        return;
    }

    println!(
        "{:<16} {:<48} {:<8} {:<10} {:<18}",
        "PARTITION", "KEY", "STATUS", "SIZE", "FETCHED"
    );
    println!("{}", "-".repeat(100));

    for row in rows {
        let status = if (200..300).contains(&row.status) {
            style(row.status.to_string()).green().to_string()
        } else {
            style(row.status.to_string()).red().to_string()
        };
        println!(
            "{:<16} {:<48} {:<8} {:<10} {:<18}",
            row.partition,
            row.key,
            status,
            format_bytes(row.bytes as u64),
            row.fetched_at
        );
    }

    println!();
    println!("Total: {} entries", rows.len());
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
