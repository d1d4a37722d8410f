use crate::config::types::{Config, DirectoryConfig, FilterConfig, OutputConfig, ScraperConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_directory_config(&config.directory)?;
    validate_filter_config(&config.filters)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates pacing and retry configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if !(config.rate_limit_per_sec > 0.0) || config.rate_limit_per_sec > 50.0 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_per_sec must be in (0, 50], got {}",
            config.rate_limit_per_sec
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.backoff_base_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "backoff_base_ms must be >= 100ms, got {}ms",
            config.backoff_base_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates directory endpoint configuration
fn validate_directory_config(config: &DirectoryConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must be http(s), got '{}'",
            base.scheme()
        )));
    }

    if !config.search_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "search_path must start with '/', got '{}'",
            config.search_path
        )));
    }

    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates record filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "at least one keyword filter is required".to_string(),
        ));
    }

    for state in &config.states {
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "state codes must be two uppercase letters, got '{}'",
                state
            )));
        }
    }

    Ok(())
}

/// Validates output path configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("cities_path", &config.cities_path),
        ("records_path", &config.records_path),
        ("unsupported_path", &config.unsupported_path),
        ("summary_path", &config.summary_path),
        ("checkpoint_path", &config.checkpoint_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
