//! Output artifacts
//!
//! This module handles:
//! - The incremental CSV records sink
//! - The unsupported cities set
//! - The end-of-run JSON summary

mod csv_sink;
mod summary;
mod unsupported;

pub use csv_sink::{CsvSink, SinkCounts};
pub use summary::{write_summary, RunSummary};
pub use unsupported::UnsupportedTracker;
