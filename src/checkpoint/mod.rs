//! Durable resume checkpoint
//!
//! The checkpoint is a single cursor recording the last fully-completed city
//! ordinal, saved after every city. Saves are atomic (write-temp-then-rename) so
//! a crash never leaves a partial file behind. The stored parameter hash ties a
//! checkpoint to the shard range and filters it was written under; resuming with
//! different parameters is refused rather than silently producing a mixed run.

use crate::cities::ShardRange;
use crate::config::FilterConfig;
use crate::{Result, RidgeError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Resume cursor, persisted after every completed city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Ordinal of the last fully-completed city (monotonically non-decreasing)
    pub last_completed_ordinal: usize,

    /// Total records written so far in this run
    pub records_written: u64,

    /// Hash of the run parameters this checkpoint belongs to
    pub params_hash: String,
}

/// Storage interface for the resume checkpoint
pub trait CheckpointStore {
    /// Loads the checkpoint, or None if no prior run exists
    fn load(&self) -> Result<Option<Checkpoint>>;

    /// Durably saves the checkpoint; atomic against crash
    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()>;

    /// Discards any prior checkpoint (reset mode)
    fn clear(&mut self) -> Result<()>;
}

/// File-backed checkpoint store (JSON, temp-then-rename writes)
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RidgeError::Checkpoint(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let checkpoint: Checkpoint = serde_json::from_str(&content).map_err(|e| {
            RidgeError::Checkpoint(format!("corrupt checkpoint {}: {}", self.path.display(), e))
        })?;

        Ok(Some(checkpoint))
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(checkpoint)?;
        std::fs::write(&temp, content).map_err(|e| {
            RidgeError::Checkpoint(format!("failed to write {}: {}", temp.display(), e))
        })?;

        // Rename is atomic on the same filesystem; a reader sees either the old
        // checkpoint or the new one, never a partial write.
        std::fs::rename(&temp, &self.path).map_err(|e| {
            RidgeError::Checkpoint(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RidgeError::Checkpoint(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// In-memory checkpoint store for tests
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    checkpoint: Option<Checkpoint>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing checkpoint, as if left by a prior run
    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint: Some(checkpoint),
        }
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoint.clone())
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        self.checkpoint = Some(checkpoint.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.checkpoint = None;
        Ok(())
    }
}

/// Computes the SHA-256 hash identifying a run's parameters
///
/// Covers the shard range and the record filters: two invocations that would
/// visit different cities or keep different records must not share a checkpoint.
pub fn run_params_hash(range: &ShardRange, filters: &FilterConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(range.start.to_le_bytes());
    match range.end {
        Some(end) => hasher.update(end.to_le_bytes()),
        None => hasher.update(b"open"),
    }

    let mut keywords = filters.keywords.clone();
    keywords.sort();
    for keyword in &keywords {
        hasher.update(keyword.to_lowercase().as_bytes());
        hasher.update(b"\0");
    }

    let mut states = filters.states.clone();
    states.sort();
    for state in &states {
        hasher.update(state.as_bytes());
        hasher.update(b"\0");
    }

    hex::encode(hasher.finalize())
}

/// Resolves the starting checkpoint for a run
///
/// Reset mode discards any prior checkpoint. Resume mode loads the prior one
/// and fails with [`RidgeError::CheckpointMismatch`] if it was written under
/// different run parameters.
pub fn resolve_checkpoint(
    store: &mut dyn CheckpointStore,
    reset: bool,
    params_hash: &str,
) -> Result<Option<Checkpoint>> {
    if reset {
        store.clear()?;
        tracing::info!("Reset: discarded prior checkpoint");
        return Ok(None);
    }

    match store.load()? {
        Some(checkpoint) => {
            if checkpoint.params_hash != params_hash {
                return Err(RidgeError::CheckpointMismatch {
                    expected: params_hash.to_string(),
                    found: checkpoint.params_hash,
                });
            }
            tracing::info!(
                "Resuming past city {} ({} records already written)",
                checkpoint.last_completed_ordinal,
                checkpoint.records_written
            );
            Ok(Some(checkpoint))
        }
        None => Ok(None),
    }
}
