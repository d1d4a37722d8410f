//! Run summary artifact
//!
//! A small JSON snapshot of the run's counters, written unconditionally at run
//! end: normal completion, early cap stop, and clean interrupt all produce one.

use crate::cities::ShardRange;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of run counters, serialized as the summary artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp of when the summary was written
    pub timestamp: String,

    pub total_records_collected: u64,
    pub total_unsupported_cities: u64,

    pub shard_start: usize,
    pub shard_end: Option<usize>,

    pub records_file: String,
    pub unsupported_cities_file: String,
}

impl RunSummary {
    pub fn new(
        total_records_collected: u64,
        total_unsupported_cities: u64,
        range: &ShardRange,
        records_file: &Path,
        unsupported_cities_file: &Path,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            total_records_collected,
            total_unsupported_cities,
            shard_start: range.start,
            shard_end: range.end,
            records_file: records_file.display().to_string(),
            unsupported_cities_file: unsupported_cities_file.display().to_string(),
        }
    }
}

/// Writes the summary as pretty-printed JSON
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    tracing::info!("Wrote run summary to {}", path.display());
    Ok(())
}
