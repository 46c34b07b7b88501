//! # Command entry points
//!
//! `run_get` wires the production HTTP transport, token provider and file
//! cache into the album pipeline. `run_cache` serves the cache maintenance
//! actions.

use crate::api_client::{CatalogEndpoints, ReqwestTransport, WebTokenProvider};
use crate::configuration::{CacheAction, ConfigFolder, GetOptions};
use crate::foundation::cache::{CleanReport, FileCacheStore};
use crate::process::{self, RunError, RunSummary};
use std::io;

const MEGABYTE: f64 = (1024 * 1024) as f64;

pub async fn run_get(cfg_folder: &ConfigFolder, options: &GetOptions) -> Result<RunSummary, RunError> {
    cfg_folder.create_dirs()?;
    let cache = FileCacheStore::open(&cfg_folder.cache_dir)?;

    let endpoints = CatalogEndpoints::default();
    let transport = ReqwestTransport::new(&endpoints);
    let tokens = WebTokenProvider::new(
        &transport,
        &endpoints,
        cfg_folder.config_file.clone(),
        options.check_token,
    );

    println!("Fetching album {}...", options.album_id);
    let summary = process::process_album(options, &tokens, &transport, &cache, &endpoints).await?;

    println!(
        "Done: {} organized, {} not found, {} failed.",
        summary.organized, summary.not_found, summary.failed
    );
    Ok(summary)
}

pub fn run_cache(cfg_folder: &ConfigFolder, action: CacheAction) -> io::Result<()> {
    let cache = FileCacheStore::open(&cfg_folder.cache_dir)?;

    match action {
        CacheAction::Size => {
            let size = cache.size()?;
            println!(
                "Actual file size: {} bytes ({:.2} Megabytes).",
                size,
                size as f64 / MEGABYTE
            );
        }
        CacheAction::Path => {
            let path = std::path::absolute(cache.cache_dir())?;
            println!("{}", path.display());
        }
        CacheAction::Clean { dry_run } => {
            let report = cache.clean(dry_run)?;
            print_clean_report(&report);
        }
        CacheAction::DryRunHint => {
            println!("You should use --dry-run with --clean-cache.");
        }
    }

    Ok(())
}

fn print_clean_report(report: &CleanReport) {
    for file in &report.files {
        println!("deleting {}", file.display());
    }
    if !report.files.is_empty() {
        println!();
    }

    println!(
        "total cleaned size is {} bytes ({:.2} Megabytes){}",
        report.total_size,
        report.total_size as f64 / MEGABYTE,
        if report.dry_run { " (DRY RUN)" } else { "" }
    );
}
