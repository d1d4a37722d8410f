//! Unsupported city tracker
//!
//! Accumulates display texts of cities that yielded no records, whether from a
//! clean empty result or a terminal/exhausted failure; the two are not
//! distinguished downstream. Kept in memory and flushed as one sorted JSON array
//! at run end or interrupt; the checkpoint already guarantees those cities are
//! not reprocessed, so no stronger durability is needed here.

use crate::Result;
use std::collections::HashSet;
use std::path::Path;

/// Deduplicated set of unsupported city display texts
///
/// Entries keep first-seen order in memory; the flushed artifact is sorted.
#[derive(Debug, Default)]
pub struct UnsupportedTracker {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl UnsupportedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloads entries from a prior interrupted run's file, if present
    pub fn load_existing(path: &Path) -> Result<Self> {
        let mut tracker = Self::new();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let entries: Vec<String> = serde_json::from_str(&content)?;
                for entry in entries {
                    tracker.add(&entry);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(tracker)
    }

    /// Adds a city; duplicates are ignored
    pub fn add(&mut self, display_text: &str) {
        if self.seen.insert(display_text.to_string()) {
            self.entries.push(display_text.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the set as a sorted JSON array
    pub fn flush(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut entries = self.entries.clone();
        entries.sort();
        let content = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, content)?;
        tracing::info!(
            "Wrote {} unsupported cities to {}",
            entries.len(),
            path.display()
        );
        Ok(())
    }
}
