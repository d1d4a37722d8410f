//! Scrape coordinator - main orchestration loop
//!
//! This module drives the per-city state machine:
//!
//! ```text
//! PENDING -> FETCHING -> { SUCCEEDED, EMPTY, FAILED }
//! ```
//!
//! Every terminal outcome advances the checkpoint, so no city can block the run.
//! Pagination, per-page retries, intra-city dedupe, caps, and the shutdown
//! signal all live here; the fetch adapter and stores are injected so the loop
//! is testable without network or disk.

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::cities::{City, ShardRange};
use crate::config::ScraperConfig;
use crate::fetch::{CityFetcher, FetchErrorKind};
use crate::output::{write_summary, CsvSink, RunSummary, UnsupportedTracker};
use crate::pacer::{interruptible_sleep, Pacer, RetryDecision, RetrySchedule};
use crate::records::BusinessRecord;
use crate::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::watch;

/// Optional early-stop conditions, checked in loop order
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCaps {
    /// Stop the run once this many records have been collected in total
    pub max_records: Option<u64>,

    /// Stop paginating a city once it has yielded this many records
    pub records_per_city: Option<usize>,

    /// Process at most this many cities from the range start
    pub max_cities: Option<usize>,
}

/// Terminal outcome of one city
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityOutcome {
    /// At least one record was persisted
    Succeeded { records: usize },

    /// Well-formed response with zero records
    Empty,

    /// Retries exhausted or terminal fetch error
    Failed { message: String },
}

/// Control-flow result of processing one city
enum CityControl {
    Completed(CityOutcome),
    /// Shutdown fired mid-city; the city is abandoned, checkpoint untouched
    Interrupted,
}

/// Final result of a run, reported to the caller
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Cumulative records written, including any resumed-from checkpoint count
    pub total_records: u64,

    pub unsupported_cities: u64,
    pub cities_processed: u64,

    /// True if the run ended on the external stop signal
    pub interrupted: bool,
}

/// Mutable per-run state threaded through the loop
///
/// Explicit value rather than process-wide globals, so concurrent test runs
/// cannot interfere with each other.
struct RunState {
    checkpoint: Checkpoint,
    cities_processed: u64,
    interrupted: bool,
}

/// Main orchestrator over an injected fetcher and checkpoint store
pub struct Coordinator<F: CityFetcher, S: CheckpointStore> {
    fetcher: F,
    store: S,
    sink: CsvSink,
    unsupported: UnsupportedTracker,
    pacer: Pacer,
    scraper_config: ScraperConfig,
    caps: RunCaps,
    range: ShardRange,
    unsupported_path: PathBuf,
    summary_path: PathBuf,
    shutdown: watch::Receiver<bool>,
    state: RunState,
}

impl<F: CityFetcher, S: CheckpointStore> Coordinator<F, S> {
    /// Creates a coordinator starting from a resolved checkpoint
    ///
    /// `initial` is the checkpoint loaded in resume mode (already validated
    /// against the parameter hash) or None for a fresh start.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetcher: F,
        store: S,
        sink: CsvSink,
        unsupported: UnsupportedTracker,
        scraper_config: ScraperConfig,
        caps: RunCaps,
        range: ShardRange,
        unsupported_path: PathBuf,
        summary_path: PathBuf,
        initial: Option<Checkpoint>,
        params_hash: String,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let checkpoint = initial.unwrap_or(Checkpoint {
            last_completed_ordinal: 0,
            records_written: 0,
            params_hash,
        });
        let pacer = Pacer::new(scraper_config.rate_limit_per_sec);

        Self {
            fetcher,
            store,
            sink,
            unsupported,
            pacer,
            scraper_config,
            caps,
            range,
            unsupported_path,
            summary_path,
            shutdown,
            state: RunState {
                checkpoint,
                cities_processed: 0,
                interrupted: false,
            },
        }
    }

    /// Runs the loop over the shard's cities and writes the final artifacts
    ///
    /// The unsupported set and summary are written on every exit path,
    /// including a fatal sink or checkpoint failure.
    pub async fn run(mut self, cities: &[City]) -> Result<RunOutcome> {
        let loop_result = self.run_loop(cities).await;

        let sink_result = self.sink.finalize();
        let artifacts_result = self.write_artifacts();

        let outcome = RunOutcome {
            total_records: self.state.checkpoint.records_written,
            unsupported_cities: self.unsupported.len() as u64,
            cities_processed: self.state.cities_processed,
            interrupted: self.state.interrupted,
        };

        loop_result?;
        let counts = sink_result?;
        artifacts_result?;

        tracing::debug!(
            "Sink wrote {} records across {} cities this process",
            counts.records_written,
            counts.cities_written
        );

        if outcome.interrupted {
            tracing::warn!(
                "Run interrupted cleanly: checkpoint at city {}, {} records written",
                self.state.checkpoint.last_completed_ordinal,
                outcome.total_records
            );
        } else {
            tracing::info!(
                "Run complete: {} cities processed, {} records, {} unsupported",
                outcome.cities_processed,
                outcome.total_records,
                outcome.unsupported_cities
            );
        }

        Ok(outcome)
    }

    async fn run_loop(&mut self, cities: &[City]) -> Result<()> {
        // Max-cities counts from the range start, so it truncates the shard
        // deterministically across interrupt and resume.
        let capped: &[City] = match self.caps.max_cities {
            Some(max) if max < cities.len() => &cities[..max],
            _ => cities,
        };

        let last_ordinal = capped.last().map(|c| c.ordinal).unwrap_or(0);
        for city in capped {
            // Resume: everything at or before the checkpoint is already done
            if city.ordinal <= self.state.checkpoint.last_completed_ordinal {
                continue;
            }

            if let Some(cap) = self.caps.max_records {
                if self.state.checkpoint.records_written >= cap {
                    tracing::info!("Global record cap of {} reached, stopping", cap);
                    break;
                }
            }

            if *self.shutdown.borrow() {
                self.state.interrupted = true;
                break;
            }

            tracing::info!(
                "[{}/{}] Processing {}",
                city.ordinal,
                last_ordinal,
                city.display_text
            );

            match self.process_city(city).await? {
                CityControl::Interrupted => {
                    tracing::info!("Abandoning {} mid-fetch on shutdown", city.display_text);
                    self.state.interrupted = true;
                    break;
                }
                CityControl::Completed(outcome) => {
                    self.complete_city(city, outcome)?;
                }
            }
        }

        Ok(())
    }

    /// Records a terminal outcome: sink write, unsupported set, checkpoint advance
    fn complete_city(&mut self, city: &City, outcome: CityOutcome) -> Result<()> {
        match &outcome {
            CityOutcome::Succeeded { records } => {
                tracing::info!(
                    "{}: collected {} records",
                    city.display_text,
                    records
                );
            }
            CityOutcome::Empty => {
                tracing::info!("{}: no records found", city.display_text);
                self.unsupported.add(&city.display_text);
            }
            CityOutcome::Failed { message } => {
                tracing::warn!("{}: failed ({})", city.display_text, message);
                self.unsupported.add(&city.display_text);
            }
        }

        let written = match outcome {
            CityOutcome::Succeeded { records } => records as u64,
            _ => 0,
        };

        // The sink write happened before we got here; only now that the city is
        // fully recorded does the checkpoint advance.
        self.state.checkpoint.last_completed_ordinal = city.ordinal;
        self.state.checkpoint.records_written += written;
        self.state.cities_processed += 1;
        self.store.save(&self.state.checkpoint)?;

        Ok(())
    }

    /// Fetches all pages of one city, dedupes, and writes to the sink
    ///
    /// Returns Err only for fatal sink failures; fetch failures classify the
    /// city, they never abort the run.
    async fn process_city(&mut self, city: &City) -> Result<CityControl> {
        // Malformed display texts can't form a search query; classified
        // unsupported without spending a request.
        if city.city_state().is_none() {
            return Ok(CityControl::Completed(CityOutcome::Failed {
                message: format!("malformed display text '{}'", city.display_text),
            }));
        }

        let mut collected: Vec<BusinessRecord> = Vec::new();
        let mut seen: HashSet<(String, String, String, String)> = HashSet::new();
        let mut failure: Option<String> = None;

        let mut page = 1u32;
        let mut total_pages = 1u32;

        'pages: while page <= total_pages {
            let fetched = match self.fetch_page_with_retry(city, page).await {
                PageFetch::Fetched(page_data) => page_data,
                PageFetch::Failed(message) => {
                    failure = Some(message);
                    break 'pages;
                }
                PageFetch::Interrupted => return Ok(CityControl::Interrupted),
            };

            total_pages = fetched.total_pages.max(1);

            // Empty page means the upstream is out of results regardless of
            // what totalPages claims.
            let page_empty = fetched.records.is_empty();
            for record in fetched.records {
                if seen.insert(record.natural_key()) {
                    collected.push(record);
                }
            }

            if let Some(cap) = self.caps.records_per_city {
                if collected.len() >= cap {
                    collected.truncate(cap);
                    tracing::debug!(
                        "{}: per-city cap of {} reached on page {}",
                        city.display_text,
                        cap,
                        page
                    );
                    break 'pages;
                }
            }

            if page_empty {
                break 'pages;
            }
            page += 1;
        }

        if !collected.is_empty() {
            // A pagination failure after some records still persists what we
            // have; the checkpoint will advance and the failure is logged.
            if let Some(message) = &failure {
                tracing::warn!(
                    "{}: pagination stopped early after {} records ({})",
                    city.display_text,
                    collected.len(),
                    message
                );
            }
            let count = collected.len();
            self.sink.write(city, &collected)?;
            return Ok(CityControl::Completed(CityOutcome::Succeeded {
                records: count,
            }));
        }

        match failure {
            Some(message) => Ok(CityControl::Completed(CityOutcome::Failed { message })),
            None => Ok(CityControl::Completed(CityOutcome::Empty)),
        }
    }

    /// One paced, retried page fetch
    async fn fetch_page_with_retry(&mut self, city: &City, page: u32) -> PageFetch {
        let mut schedule = RetrySchedule::from_config(&self.scraper_config);

        loop {
            if !self.pacer.acquire(&mut self.shutdown).await {
                return PageFetch::Interrupted;
            }

            let attempt = schedule.next_attempt();
            tracing::debug!(
                "Fetching {} page {} (attempt {})",
                city.display_text,
                page,
                attempt
            );

            let error = match self.fetcher.fetch_page(city, page).await {
                Ok(fetched) => return PageFetch::Fetched(fetched),
                Err(e) => e,
            };

            match error.kind {
                FetchErrorKind::Terminal => {
                    return PageFetch::Failed(format!("terminal error: {}", error));
                }
                FetchErrorKind::Transient => {
                    match schedule.on_transient_failure(error.retry_after) {
                        RetryDecision::RetryAfter(delay) => {
                            tracing::warn!(
                                "{} page {} attempt {} failed ({}), retrying in {:?}",
                                city.display_text,
                                page,
                                attempt,
                                error,
                                delay
                            );
                            if !interruptible_sleep(delay, &mut self.shutdown).await {
                                return PageFetch::Interrupted;
                            }
                        }
                        RetryDecision::GiveUp => {
                            return PageFetch::Failed(format!(
                                "retries exhausted after {} attempts: {}",
                                attempt, error
                            ));
                        }
                    }
                }
            }
        }
    }

    /// Writes the unsupported set and run summary
    fn write_artifacts(&mut self) -> Result<()> {
        self.unsupported.flush(&self.unsupported_path)?;

        let summary = RunSummary::new(
            self.state.checkpoint.records_written,
            self.unsupported.len() as u64,
            &self.range,
            self.sink.path(),
            &self.unsupported_path,
        );
        write_summary(&summary, &self.summary_path)
    }
}

enum PageFetch {
    Fetched(crate::fetch::CityPage),
    Failed(String),
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::JsonCheckpointStore;
    use crate::config::BackoffMode;
    use crate::fetch::{CityPage, FetchError};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted fetch adapter: maps (display_text, page) to a canned response
    struct ScriptedFetcher {
        pages: HashMap<(String, u32), Vec<ScriptedResponse>>,
        calls: RefCell<HashMap<(String, u32), usize>>,
        visited: RefCell<Vec<String>>,
    }

    #[derive(Clone)]
    enum ScriptedResponse {
        Page(Vec<BusinessRecord>, u32),
        Transient,
        Terminal,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                calls: RefCell::new(HashMap::new()),
                visited: RefCell::new(Vec::new()),
            }
        }

        fn script(
            mut self,
            city: &str,
            page: u32,
            responses: Vec<ScriptedResponse>,
        ) -> Self {
            self.pages.insert((city.to_string(), page), responses);
            self
        }

        fn visited_cities(&self) -> Vec<String> {
            let mut cities = self.visited.borrow().clone();
            cities.dedup();
            cities
        }
    }

    impl CityFetcher for &ScriptedFetcher {
        async fn fetch_page(
            &self,
            city: &City,
            page: u32,
        ) -> std::result::Result<CityPage, FetchError> {
            self.visited.borrow_mut().push(city.display_text.clone());
            let key = (city.display_text.clone(), page);
            let call_index = {
                let mut calls = self.calls.borrow_mut();
                let entry = calls.entry(key.clone()).or_insert(0);
                let i = *entry;
                *entry += 1;
                i
            };

            let responses = self
                .pages
                .get(&key)
                .unwrap_or_else(|| panic!("unscripted fetch: {:?}", key));
            let response = responses
                .get(call_index)
                .unwrap_or_else(|| responses.last().unwrap());

            match response.clone() {
                ScriptedResponse::Page(records, total_pages) => Ok(CityPage {
                    records,
                    total_pages,
                }),
                ScriptedResponse::Transient => Err(FetchError::transient("HTTP 500")),
                ScriptedResponse::Terminal => Err(FetchError::terminal("HTTP 404")),
            }
        }
    }

    fn record(name: &str) -> BusinessRecord {
        BusinessRecord {
            business_name: name.to_string(),
            street_address: "100 Main St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "78701".to_string(),
            ..Default::default()
        }
    }

    fn cities(texts: &[&str]) -> Vec<City> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| City {
                display_text: t.to_string(),
                ordinal: i + 1,
            })
            .collect()
    }

    fn fast_config() -> ScraperConfig {
        ScraperConfig {
            rate_limit_per_sec: 50.0,
            max_retries: 3,
            backoff_base_ms: 2000,
            backoff_mode: BackoffMode::Exponential,
            request_timeout_secs: 5,
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        shutdown_tx: watch::Sender<bool>,
        shutdown_rx: watch::Receiver<bool>,
    }

    impl Harness {
        fn new() -> Self {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            Self {
                dir: tempfile::tempdir().unwrap(),
                shutdown_tx,
                shutdown_rx,
            }
        }

        fn coordinator<'f>(
            &self,
            fetcher: &'f ScriptedFetcher,
            caps: RunCaps,
            range: ShardRange,
            initial: Option<Checkpoint>,
        ) -> Coordinator<&'f ScriptedFetcher, JsonCheckpointStore> {
            let resume = initial.is_some();
            Coordinator::new(
                fetcher,
                JsonCheckpointStore::new(self.dir.path().join("checkpoint.json")),
                CsvSink::new(self.dir.path().join("records.csv"), resume),
                UnsupportedTracker::new(),
                fast_config(),
                caps,
                range,
                self.dir.path().join("unsupported.json"),
                self.dir.path().join("summary.json"),
                initial,
                "test-hash".to_string(),
                self.shutdown_rx.clone(),
            )
        }

        fn records_file_rows(&self) -> Vec<String> {
            std::fs::read_to_string(self.dir.path().join("records.csv"))
                .unwrap()
                .lines()
                .skip(1)
                .map(String::from)
                .collect()
        }

        fn unsupported(&self) -> Vec<String> {
            serde_json::from_str(
                &std::fs::read_to_string(self.dir.path().join("unsupported.json")).unwrap(),
            )
            .unwrap()
        }

        fn saved_checkpoint(&self) -> Checkpoint {
            serde_json::from_str(
                &std::fs::read_to_string(self.dir.path().join("checkpoint.json")).unwrap(),
            )
            .unwrap()
        }
    }

    /// Canonical mixed run: A yields 2 records, B is clean-empty, C fails 500 thrice
    #[tokio::test(start_paused = true)]
    async fn test_scenario_mixed_outcomes() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new()
            .script(
                "A, ST",
                1,
                vec![ScriptedResponse::Page(
                    vec![record("Apex Roofing"), record("Best Roofing")],
                    1,
                )],
            )
            .script("B, ST", 1, vec![ScriptedResponse::Page(vec![], 1)])
            .script("C, ST", 1, vec![ScriptedResponse::Transient]);

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: Some(3) },
            None,
        );

        let outcome = coordinator
            .run(&cities(&["A, ST", "B, ST", "C, ST"]))
            .await
            .unwrap();

        assert_eq!(outcome.total_records, 2);
        assert_eq!(outcome.unsupported_cities, 2);
        assert!(!outcome.interrupted);

        assert_eq!(harness.records_file_rows().len(), 2);
        assert_eq!(harness.unsupported(), vec!["B, ST", "C, ST"]);

        let saved = harness.saved_checkpoint();
        assert_eq!(saved.last_completed_ordinal, 3);
        assert_eq!(saved.records_written, 2);

        let summary: crate::output::RunSummary = serde_json::from_str(
            &std::fs::read_to_string(harness.dir.path().join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary.total_records_collected, 2);
        assert_eq!(summary.total_unsupported_cities, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_advances_past_failures() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new()
            .script("A, ST", 1, vec![ScriptedResponse::Terminal])
            .script(
                "B, ST",
                1,
                vec![ScriptedResponse::Page(vec![record("Apex Roofing")], 1)],
            );

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["A, ST", "B, ST"])).await.unwrap();

        // Terminal failure on A did not block B
        assert_eq!(outcome.cities_processed, 2);
        assert_eq!(outcome.total_records, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_skips_completed_cities() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new().script(
            "C, ST",
            1,
            vec![ScriptedResponse::Page(vec![record("Crown Roofing")], 1)],
        );

        let initial = Checkpoint {
            last_completed_ordinal: 2,
            records_written: 5,
            params_hash: "test-hash".to_string(),
        };
        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            Some(initial),
        );

        let outcome = coordinator
            .run(&cities(&["A, ST", "B, ST", "C, ST"]))
            .await
            .unwrap();

        // Only C was visited; no ordinal at or below the checkpoint
        assert_eq!(fetcher.visited_cities(), vec!["C, ST"]);
        assert_eq!(outcome.cities_processed, 1);
        // Cumulative count includes the resumed-from 5
        assert_eq!(outcome.total_records, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_collects_all_pages_and_dedupes() {
        let harness = Harness::new();
        // The same business appears on both pages; one stored record results
        let fetcher = ScriptedFetcher::new()
            .script(
                "A, ST",
                1,
                vec![ScriptedResponse::Page(
                    vec![record("Apex Roofing"), record("Best Roofing")],
                    2,
                )],
            )
            .script(
                "A, ST",
                2,
                vec![ScriptedResponse::Page(
                    vec![record("Apex Roofing"), record("Crown Roofing")],
                    2,
                )],
            );

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["A, ST"])).await.unwrap();
        assert_eq!(outcome.total_records, 3);
        assert_eq!(harness.records_file_rows().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_retry_then_succeed() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new().script(
            "A, ST",
            1,
            vec![
                ScriptedResponse::Transient,
                ScriptedResponse::Transient,
                ScriptedResponse::Page(vec![record("Apex Roofing")], 1),
            ],
        );

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["A, ST"])).await.unwrap();
        assert_eq!(outcome.total_records, 1);
        assert_eq!(outcome.unsupported_cities, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_city_cap_stops_pagination() {
        let harness = Harness::new();
        // Page 2 is scripted but must never be needed
        let fetcher = ScriptedFetcher::new().script(
            "A, ST",
            1,
            vec![ScriptedResponse::Page(
                vec![record("Apex Roofing"), record("Best Roofing"), record("Crown Roofing")],
                5,
            )],
        );

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps {
                records_per_city: Some(2),
                ..Default::default()
            },
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["A, ST"])).await.unwrap();
        assert_eq!(outcome.total_records, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_record_cap_stops_between_cities() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new()
            .script(
                "A, ST",
                1,
                vec![ScriptedResponse::Page(
                    vec![record("Apex Roofing"), record("Best Roofing")],
                    1,
                )],
            )
            .script(
                "B, ST",
                1,
                vec![ScriptedResponse::Page(vec![record("Crown Roofing")], 1)],
            );

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps {
                max_records: Some(2),
                ..Default::default()
            },
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["A, ST", "B, ST"])).await.unwrap();

        // A completed fully and hit the cap; B was never visited
        assert_eq!(outcome.total_records, 2);
        assert_eq!(fetcher.visited_cities(), vec!["A, ST"]);
        assert_eq!(outcome.cities_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_cities_truncates_range() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new()
            .script("A, ST", 1, vec![ScriptedResponse::Page(vec![], 1)])
            .script("B, ST", 1, vec![ScriptedResponse::Page(vec![], 1)]);

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps {
                max_cities: Some(2),
                ..Default::default()
            },
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator
            .run(&cities(&["A, ST", "B, ST", "C, ST"]))
            .await
            .unwrap();
        assert_eq!(outcome.cities_processed, 2);
        assert_eq!(fetcher.visited_cities(), vec!["A, ST", "B, ST"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_display_text_is_unsupported() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new();

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            None,
        );

        let outcome = coordinator.run(&cities(&["NotACity"])).await.unwrap();

        // No fetch was attempted, but the city completed as unsupported
        assert!(fetcher.visited_cities().is_empty());
        assert_eq!(outcome.unsupported_cities, 1);
        assert_eq!(outcome.cities_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_city_leaves_checkpoint_at_last_complete() {
        let harness = Harness::new();
        let fetcher = ScriptedFetcher::new()
            .script(
                "A, ST",
                1,
                vec![ScriptedResponse::Page(vec![record("Apex Roofing")], 1)],
            )
            // B keeps failing transiently; shutdown fires during its backoff
            .script("B, ST", 1, vec![ScriptedResponse::Transient]);

        let coordinator = harness.coordinator(
            &fetcher,
            RunCaps::default(),
            ShardRange { start: 1, end: None },
            None,
        );

        let shutdown_tx = harness.shutdown_tx.clone();
        let handle = tokio::spawn(async move {
            // Fires while B sits in its first 2s backoff wait
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            let _ = shutdown_tx.send(true);
        });

        let outcome = coordinator.run(&cities(&["A, ST", "B, ST"])).await.unwrap();
        handle.await.unwrap();

        assert!(outcome.interrupted);
        // A completed; B was abandoned without advancing the checkpoint
        assert_eq!(outcome.cities_processed, 1);
        assert_eq!(outcome.total_records, 1);
        assert_eq!(harness.saved_checkpoint().last_completed_ordinal, 1);
    }
}
