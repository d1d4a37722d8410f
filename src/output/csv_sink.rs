//! Incremental CSV records sink
//!
//! Rows are appended and flushed per city, so a crash loses at most the
//! in-flight city. A fresh run renames any pre-existing file at the same path to
//! a dated backup before writing; a resumed run reopens the prior file in append
//! mode, since the checkpoint hash already guarantees the schema matches.

use crate::cities::City;
use crate::records::{BusinessRecord, CSV_COLUMNS};
use crate::{Result, RidgeError};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Counts reported when the sink is finalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCounts {
    /// Cities that produced at least one written record
    pub cities_written: u64,

    /// Records written by this process
    pub records_written: u64,
}

/// Append-only CSV sink with per-city flushing
pub struct CsvSink {
    path: PathBuf,
    resume: bool,
    writer: Option<csv::Writer<File>>,
    counts: SinkCounts,
}

impl CsvSink {
    /// Creates a sink; no file is touched until the first write
    pub fn new(path: impl Into<PathBuf>, resume: bool) -> Self {
        Self {
            path: path.into(),
            resume,
            writer: None,
            counts: SinkCounts::default(),
        }
    }

    fn sink_err(&self, source: std::io::Error) -> RidgeError {
        RidgeError::Sink {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Renames an existing output to a dated backup, e.g. `records.20260825T101500.bak.csv`
    fn backup_existing(path: &Path) -> std::io::Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }

        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("records");
        let backup = path.with_file_name(format!("{}.{}.bak.csv", stem, stamp));
        std::fs::rename(path, &backup)?;
        Ok(Some(backup))
    }

    fn open_writer(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| RidgeError::Sink {
                    path: self.path.display().to_string(),
                    source: e,
                })?;
            }
        }

        let append_existing = self.resume && self.path.exists();
        if !append_existing {
            if let Some(backup) = Self::backup_existing(&self.path).map_err(|e| RidgeError::Sink {
                path: self.path.display().to_string(),
                source: e,
            })? {
                tracing::info!("Backed up previous records file to {}", backup.display());
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RidgeError::Sink {
                path: self.path.display().to_string(),
                source: e,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !append_existing {
            writer.write_record(CSV_COLUMNS)?;
            writer.flush().map_err(|e| RidgeError::Sink {
                path: self.path.display().to_string(),
                source: e,
            })?;
        }

        self.writer = Some(writer);
        Ok(())
    }

    /// Appends one city's records and flushes them to disk
    pub fn write(&mut self, city: &City, records: &[BusinessRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if self.writer.is_none() {
            self.open_writer()?;
        }
        if let Some(writer) = self.writer.as_mut() {
            for record in records {
                writer.write_record(record.to_fields())?;
            }
            writer.flush().map_err(|e| RidgeError::Sink {
                path: self.path.display().to_string(),
                source: e,
            })?;
        }

        self.counts.cities_written += 1;
        self.counts.records_written += records.len() as u64;
        tracing::debug!(
            "Wrote {} records for {} ({} total this run)",
            records.len(),
            city.display_text,
            self.counts.records_written
        );

        Ok(())
    }

    /// Flushes and closes the sink, returning what was written
    pub fn finalize(&mut self) -> Result<SinkCounts> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| self.sink_err(e))?;
        }
        Ok(self.counts)
    }

    /// Path of the records file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
