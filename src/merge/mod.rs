//! Offline merge of shard outputs
//!
//! Combines the finalized CSV outputs of several shard runs into one canonical
//! file. Inputs are treated as immutable; the first-seen row per natural key
//! wins, in input-file order then intra-file order. All inputs must share the
//! first file's header, otherwise the pass fails with a schema mismatch rather
//! than guessing at column alignment.

use crate::records::CSV_COLUMNS;
use crate::{Result, RidgeError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Outcome of a merge pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub files_merged: usize,
    pub rows_written: u64,
    pub duplicates_removed: u64,
}

/// Column indices forming the natural key, resolved against the actual header
fn key_indices(header: &csv::StringRecord) -> Result<[usize; 4]> {
    let mut indices = [0usize; 4];
    for (slot, name) in ["business_name", "street_address", "city", "state"]
        .iter()
        .enumerate()
    {
        indices[slot] = header
            .iter()
            .position(|h| h == *name)
            .ok_or_else(|| RidgeError::SchemaMismatch {
                path: "<merge inputs>".to_string(),
                expected: CSV_COLUMNS.iter().map(|s| s.to_string()).collect(),
                found: header.iter().map(String::from).collect(),
            })?;
    }
    Ok(indices)
}

fn row_key(row: &csv::StringRecord, indices: &[usize; 4]) -> (String, String, String, String) {
    let field = |i: usize| row.get(i).unwrap_or("").trim().to_lowercase();
    (
        field(indices[0]),
        field(indices[1]),
        field(indices[2]),
        field(indices[3]),
    )
}

/// Merges finalized shard CSVs into `output`, deduplicating by natural key
pub fn merge_csv_files(inputs: &[PathBuf], output: &Path) -> Result<MergeReport> {
    if inputs.is_empty() {
        return Err(RidgeError::CityList(
            "merge requires at least one input file".to_string(),
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut expected_header: Option<csv::StringRecord> = None;
    let mut indices = [0usize; 4];
    let mut writer = csv::Writer::from_path(output)?;
    let mut seen: HashSet<(String, String, String, String)> = HashSet::new();

    let mut rows_written = 0u64;
    let mut duplicates_removed = 0u64;

    for input in inputs {
        let mut reader = csv::Reader::from_path(input)?;
        let header = reader.headers()?.clone();

        match &expected_header {
            None => {
                indices = key_indices(&header)?;
                writer.write_record(&header)?;
                expected_header = Some(header);
            }
            Some(expected) => {
                if &header != expected {
                    return Err(RidgeError::SchemaMismatch {
                        path: input.display().to_string(),
                        expected: expected.iter().map(String::from).collect(),
                        found: header.iter().map(String::from).collect(),
                    });
                }
            }
        }

        for row in reader.records() {
            let row = row?;
            if seen.insert(row_key(&row, &indices)) {
                writer.write_record(&row)?;
                rows_written += 1;
            } else {
                duplicates_removed += 1;
            }
        }

        tracing::info!("Merged {}", input.display());
    }

    writer.flush()?;

    let report = MergeReport {
        files_merged: inputs.len(),
        rows_written,
        duplicates_removed,
    };
    tracing::info!(
        "Merge complete: {} files, {} rows written, {} duplicates removed",
        report.files_merged,
        report.rows_written,
        report.duplicates_removed
    );
    Ok(report)
}
