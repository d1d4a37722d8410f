//! Scrape orchestration
//!
//! This module contains the run loop that drives the whole scrape:
//! partitioning the city list, resuming from the checkpoint, pacing and
//! retrying fetches, and writing the output artifacts.

mod coordinator;

pub use coordinator::{CityOutcome, Coordinator, RunCaps, RunOutcome};

use crate::checkpoint::{resolve_checkpoint, run_params_hash, JsonCheckpointStore};
use crate::cities::{load_cities, partition, ShardRange};
use crate::config::Config;
use crate::fetch::DirectoryClient;
use crate::output::{CsvSink, UnsupportedTracker};
use crate::Result;
use std::path::Path;
use tokio::sync::watch;

/// Runs a complete scrape over the configured shard range
///
/// This is the main entry point. It will:
/// 1. Load the canonical city list and select the shard's slice
/// 2. Resolve the checkpoint (reset or resume, with parameter-hash check)
/// 3. Build the HTTP client and output sinks
/// 4. Install a ctrl-c handler wired to the cancellable waits
/// 5. Drive the per-city loop to completion, cap, or interrupt
pub async fn run_scrape(
    config: &Config,
    range: ShardRange,
    reset: bool,
    caps: RunCaps,
) -> Result<RunOutcome> {
    let cities = load_cities(Path::new(&config.output.cities_path))?;
    let shard = partition(&cities, &range)?;
    tracing::info!("Shard {} owns {} of {} cities", range, shard.len(), cities.len());

    let params_hash = run_params_hash(&range, &config.filters);
    let mut store = JsonCheckpointStore::new(&config.output.checkpoint_path);
    let initial = resolve_checkpoint(&mut store, reset, &params_hash)?;
    let resuming = initial.is_some();

    let unsupported = if resuming {
        UnsupportedTracker::load_existing(Path::new(&config.output.unsupported_path))?
    } else {
        UnsupportedTracker::new()
    };

    let sink = CsvSink::new(&config.output.records_path, resuming);
    let fetcher = DirectoryClient::new(config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the in-flight city wait and stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    let coordinator = Coordinator::new(
        fetcher,
        store,
        sink,
        unsupported,
        config.scraper.clone(),
        caps,
        range,
        config.output.unsupported_path.clone().into(),
        config.output.summary_path.clone().into(),
        initial,
        params_hash,
        shutdown_rx,
    );

    coordinator.run(shard).await
}
