//! Ridgeline: a resumable bulk directory scraper
//!
//! This crate implements a checkpointed, rate-limited scrape orchestrator that
//! walks an ordered list of US cities, collects business records from a paginated
//! directory search API, and persists results incrementally so a multi-day run
//! survives interruption without data loss or duplication.

pub mod checkpoint;
pub mod cities;
pub mod config;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod pacer;
pub mod records;
pub mod scraper;

use thiserror::Error;

/// Main error type for Ridgeline operations
#[derive(Debug, Error)]
pub enum RidgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid shard range: {0}")]
    InvalidRange(String),

    #[error("Checkpoint parameter mismatch: checkpoint has hash {found}, current run parameters hash to {expected} (use --reset to discard it)")]
    CheckpointMismatch { expected: String, found: String },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Sink write error for {path}: {source}")]
    Sink {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema mismatch in {path}: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("City list error: {0}")]
    CityList(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ridgeline operations
pub type Result<T> = std::result::Result<T, RidgeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointStore, JsonCheckpointStore};
pub use cities::{partition, City, ShardRange};
pub use config::Config;
pub use records::BusinessRecord;
pub use scraper::{run_scrape, RunOutcome};
