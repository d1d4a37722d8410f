use serde::Deserialize;

/// Main configuration structure for Ridgeline
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub directory: DirectoryConfig,
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

/// Pacing and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Requests per second allowed against the directory (single shared budget)
    #[serde(rename = "rate-limit-per-sec")]
    pub rate_limit_per_sec: f64,

    /// Maximum retry attempts for a transient fetch failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base backoff delay between retries (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Backoff growth mode: "fixed" or "exponential"
    #[serde(rename = "backoff-mode", default = "default_backoff_mode")]
    pub backoff_mode: BackoffMode,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// How the retry delay grows with the attempt number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffMode {
    /// Same delay between every retry
    Fixed,
    /// Delay doubles with each retry
    Exponential,
}

fn default_backoff_mode() -> BackoffMode {
    BackoffMode::Exponential
}

fn default_request_timeout() -> u64 {
    30
}

/// Directory search endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory site (e.g. "https://www.bbb.org")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated search endpoint
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Business category searched in every city
    pub category: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Record inclusion filters
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// A business name must contain at least one of these (case-insensitive)
    pub keywords: Vec<String>,

    /// Two-letter state codes to include
    pub states: Vec<String>,

    /// Minimum street address length for a record to count
    #[serde(rename = "min-address-length", default = "default_min_address")]
    pub min_address_length: usize,

    /// Minimum business name length for a record to count
    #[serde(rename = "min-business-name-length", default = "default_min_name")]
    pub min_business_name_length: usize,
}

fn default_min_address() -> usize {
    3
}

fn default_min_name() -> usize {
    2
}

/// File paths for inputs and output artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSON array of "City, ST" display texts, the canonical ordered unit source
    #[serde(rename = "cities-path")]
    pub cities_path: String,

    /// CSV records file
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// JSON array of unsupported city display texts
    #[serde(rename = "unsupported-path")]
    pub unsupported_path: String,

    /// JSON run summary
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Internal resume checkpoint (not a public contract)
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}
