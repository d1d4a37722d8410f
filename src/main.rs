//! Ridgeline main entry point
//!
//! Command-line interface for the bulk directory scraper: a checkpointed
//! scrape over a shard of the city list, plus an offline merge mode for
//! combining finalized shard outputs.

use anyhow::Context;
use clap::Parser;
use ridgeline::cities::ShardRange;
use ridgeline::config::load_config;
use ridgeline::merge::merge_csv_files;
use ridgeline::scraper::{run_scrape, RunCaps};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ridgeline: a resumable bulk directory scraper
///
/// Walks an ordered list of cities, collects business records from a paginated
/// directory search, and checkpoints after every city so an interrupted run
/// resumes where it left off. Shards are assigned with --start-index and
/// --end-index; their outputs are combined afterwards with --merge.
#[derive(Parser, Debug)]
#[command(name = "ridgeline")]
#[command(version = "1.0.0")]
#[command(about = "A resumable bulk directory scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard the checkpoint and start at the range beginning
    #[arg(long)]
    reset: bool,

    /// Explicitly resume from the checkpoint (the default behavior)
    #[arg(long, conflicts_with = "reset")]
    pause: bool,

    /// Global cap on total records collected
    #[arg(long, value_name = "N")]
    records: Option<u64>,

    /// Per-city cap on records before moving on
    #[arg(long = "records-per-city", value_name = "N")]
    records_per_city: Option<usize>,

    /// Process at most N cities from the range start
    #[arg(long = "max-cities", value_name = "N")]
    max_cities: Option<usize>,

    /// Legacy offset: skip the first N cities (same as --start-index N+1)
    #[arg(long = "skip-cities", value_name = "N", conflicts_with = "start_index")]
    skip_cities: Option<usize>,

    /// First city ordinal of this shard (1-based, inclusive)
    #[arg(long = "start-index", value_name = "N")]
    start_index: Option<usize>,

    /// Last city ordinal of this shard (inclusive)
    #[arg(long = "end-index", value_name = "N")]
    end_index: Option<usize>,

    /// Merge finalized shard CSVs instead of scraping
    #[arg(long = "merge", value_name = "FILE", num_args = 1..)]
    merge: Option<Vec<PathBuf>>,

    /// Output path for the merged CSV
    #[arg(long = "merge-output", value_name = "PATH", requires = "merge")]
    merge_output: Option<PathBuf>,
}

impl Cli {
    fn shard_range(&self) -> ShardRange {
        let start = match (self.start_index, self.skip_cities) {
            (Some(start), _) => start,
            (None, Some(skip)) => skip + 1,
            (None, None) => 1,
        };
        ShardRange {
            start,
            end: self.end_index,
        }
    }

    fn caps(&self) -> RunCaps {
        RunCaps {
            max_records: self.records,
            records_per_city: self.records_per_city,
            max_cities: self.max_cities,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Some(inputs) = &cli.merge {
        return handle_merge(inputs, cli.merge_output.as_deref());
    }

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let range = cli.shard_range();
    if cli.reset {
        tracing::info!("Starting fresh run over shard {}", range);
    } else if cli.pause {
        tracing::info!("Resuming over shard {} from the saved checkpoint", range);
    } else {
        tracing::info!("Starting run over shard {} (resuming if a checkpoint exists)", range);
    }

    let outcome = run_scrape(&config, range, cli.reset, cli.caps()).await?;

    if outcome.interrupted {
        tracing::info!("Interrupted; checkpoint saved, rerun to resume");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ridgeline=info,warn"),
            1 => EnvFilter::new("ridgeline=debug,info"),
            2 => EnvFilter::new("ridgeline=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --merge mode: combines finalized shard outputs into one CSV
fn handle_merge(inputs: &[PathBuf], output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| std::path::Path::new("data/merged_records.csv"));

    let report = merge_csv_files(inputs, output).context("merge failed")?;

    println!(
        "Merged {} files -> {} ({} rows, {} duplicates removed)",
        report.files_merged,
        output.display(),
        report.rows_written,
        report.duplicates_removed
    );

    Ok(())
}
