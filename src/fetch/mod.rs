//! Fetch-extract adapter
//!
//! One logical call per page of a city's search results. The adapter owns all
//! site-specific knowledge (endpoint shape, payload layout, record filters) and
//! hands the orchestrator either extracted records or a classified failure, so
//! the retry controller branches on a typed kind instead of status-code text.

mod client;
mod extract;

pub use client::{build_http_client, DirectoryClient};
pub use extract::{contains_keyword, extract_record, record_passes_filters};

use crate::cities::City;
use crate::records::BusinessRecord;
use std::time::Duration;

/// One page of search results for a city
#[derive(Debug, Clone, Default)]
pub struct CityPage {
    /// Records extracted from this page, in payload order
    pub records: Vec<BusinessRecord>,

    /// Total pages the upstream reports for this query
    pub total_pages: u32,
}

/// How a fetch failure should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Worth retrying: timeout, connect failure, 5xx, 429
    Transient,

    /// Never retried: non-429 4xx, malformed payload
    Terminal,
}

/// A classified fetch failure
#[derive(Debug, Clone)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,

    /// Server-provided retry hint (Retry-After), if any
    pub retry_after: Option<Duration>,
}

impl FetchError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transient,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Terminal,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, hint: Option<Duration>) -> Self {
        self.retry_after = hint;
        self
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Fetches one page of results for a city
///
/// Implemented by [`DirectoryClient`] for the real directory API and by scripted
/// fakes in tests. A single fetch makes exactly one external request; pagination
/// and retries live in the orchestrator and retry controller.
#[allow(async_fn_in_trait)]
pub trait CityFetcher {
    async fn fetch_page(&self, city: &City, page: u32) -> Result<CityPage, FetchError>;
}
