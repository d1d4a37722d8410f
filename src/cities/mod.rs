//! Unit source and partitioner
//!
//! The canonical ordered city list is a JSON array of "City, ST" display texts.
//! Each entry becomes a [`City`] with a 1-based ordinal, fixed for the lifetime of
//! a run. A [`ShardRange`] selects the contiguous slice of the list that one
//! process owns; disjointness of ranges across concurrently running shards is the
//! operator's responsibility, not enforced here.

use crate::{Result, RidgeError};
use std::path::Path;

/// One unit of work: a city from the canonical list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    /// Display text as it appears in the source list, e.g. "Austin, TX"
    pub display_text: String,

    /// 1-based position in the canonical list
    pub ordinal: usize,
}

impl City {
    /// Splits the display text into (city, state) on the last ", " separator
    ///
    /// Returns None for malformed entries; those are classified unsupported
    /// when processed rather than rejected at load.
    pub fn city_state(&self) -> Option<(&str, &str)> {
        let (city, state) = self.display_text.rsplit_once(", ")?;
        let city = city.trim();
        let state = state.trim();
        if city.is_empty() || state.is_empty() {
            return None;
        }
        Some((city, state))
    }
}

/// A contiguous 1-based inclusive sub-range of the canonical city list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRange {
    /// First ordinal owned by this shard (1-based, inclusive)
    pub start: usize,

    /// Last ordinal owned by this shard (inclusive); None means to list end
    pub end: Option<usize>,
}

impl ShardRange {
    /// Validates the range bounds
    ///
    /// `start < 1` and `start > end` are operator errors, rejected at startup.
    pub fn validate(&self) -> Result<()> {
        if self.start < 1 {
            return Err(RidgeError::InvalidRange(format!(
                "start index must be >= 1, got {}",
                self.start
            )));
        }
        if let Some(end) = self.end {
            if self.start > end {
                return Err(RidgeError::InvalidRange(format!(
                    "start index {} is past end index {}",
                    self.start, end
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ShardRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {}]", self.start, end),
            None => write!(f, "[{}, end]", self.start),
        }
    }
}

/// Loads the canonical city list from a JSON array of display texts
pub fn load_cities(path: &Path) -> Result<Vec<City>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RidgeError::CityList(format!("failed to read {}: {}", path.display(), e))
    })?;

    let display_texts: Vec<String> = serde_json::from_str(&content)?;

    tracing::info!(
        "Loaded {} cities from {}",
        display_texts.len(),
        path.display()
    );

    Ok(display_texts
        .into_iter()
        .enumerate()
        .map(|(i, display_text)| City {
            display_text,
            ordinal: i + 1,
        })
        .collect())
}

/// Selects the slice of the canonical list owned by a shard range
///
/// Pure and stateless. A start past the list end yields an empty slice, not an
/// error: a shard assigned beyond the list simply has nothing to do. An end past
/// the list end is clamped.
pub fn partition<'a>(cities: &'a [City], range: &ShardRange) -> Result<&'a [City]> {
    range.validate()?;

    let from = range.start - 1;
    if from >= cities.len() {
        return Ok(&[]);
    }

    let to = range.end.unwrap_or(cities.len()).min(cities.len());
    Ok(&cities[from..to])
}
