//! Configuration module for Ridgeline
//!
//! This module handles loading, parsing, and validating TOML configuration files.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffMode, Config, DirectoryConfig, FilterConfig, OutputConfig, ScraperConfig,
};

// Re-export parser functions
pub use parser::load_config;
