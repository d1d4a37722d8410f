//! HTTP client for the directory search API
//!
//! This module handles:
//! - Building the reqwest client with the configured user agent and timeouts
//! - Issuing one paginated search request per call
//! - Classifying failures into transient vs terminal kinds
//! - Extracting and filtering records from the JSON payload

use crate::cities::City;
use crate::config::{Config, DirectoryConfig, FilterConfig};
use crate::fetch::extract::{extract_record, record_passes_filters};
use crate::fetch::{CityFetcher, CityPage, FetchError};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the configured user agent and timeouts
pub fn build_http_client(
    directory: &DirectoryConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(&directory.user_agent)
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch-extract adapter backed by the real directory search endpoint
pub struct DirectoryClient {
    client: Client,
    search_url: Url,
    base_url: String,
    category: String,
    filters: FilterConfig,
}

impl DirectoryClient {
    /// Creates a client from the loaded configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let base = Url::parse(&config.directory.base_url)
            .map_err(|e| crate::ConfigError::InvalidUrl(e.to_string()))?;
        let search_url = base
            .join(&config.directory.search_path)
            .map_err(|e| crate::ConfigError::InvalidUrl(e.to_string()))?;

        let client = build_http_client(
            &config.directory,
            Duration::from_secs(config.scraper.request_timeout_secs),
        )
        .map_err(|e| crate::RidgeError::Config(crate::ConfigError::Validation(e.to_string())))?;

        Ok(Self {
            client,
            search_url,
            base_url: config.directory.base_url.clone(),
            category: config.directory.category.clone(),
            filters: config.filters.clone(),
        })
    }

    fn classify_response_error(status: StatusCode, response: &Response) -> FetchError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let hint = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return FetchError::transient(format!("HTTP {}", status)).with_retry_after(hint);
        }

        if status.is_server_error() {
            return FetchError::transient(format!("HTTP {}", status));
        }

        FetchError::terminal(format!("HTTP {}", status))
    }

    fn classify_request_error(e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::transient("request timeout")
        } else if e.is_connect() {
            FetchError::transient(format!("connection failed: {}", e))
        } else {
            FetchError::terminal(format!("request failed: {}", e))
        }
    }
}

impl CityFetcher for DirectoryClient {
    async fn fetch_page(&self, city: &City, page: u32) -> Result<CityPage, FetchError> {
        let page_str = page.to_string();
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("location", city.display_text.as_str()),
                ("category", self.category.as_str()),
                ("pageNumber", page_str.as_str()),
            ])
            .send()
            .await
            .map_err(Self::classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_response_error(status, &response));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::terminal(format!("malformed payload: {}", e)))?;

        let search_result = payload
            .get("searchResult")
            .ok_or_else(|| FetchError::terminal("payload missing searchResult"))?;

        let total_pages = search_result
            .get("totalPages")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(1) as u32;

        let records = search_result
            .get("results")
            .and_then(serde_json::Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter(|r| record_passes_filters(r, &self.filters))
                    .map(|r| extract_record(r, &self.base_url))
                    .collect()
            })
            .unwrap_or_default();

        Ok(CityPage {
            records,
            total_pages,
        })
    }
}
