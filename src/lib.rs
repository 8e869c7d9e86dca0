//! Dorkscan: a batched, dork-driven search-and-crawl engine
//!
//! This crate takes a base query plus a set of search-engine qualifier strings
//! ("dorks"), runs paginated searches for each dork, and crawls the resulting
//! URLs with a bounded worker pool to pull structured content (headings,
//! paragraphs, contact sections, business info, social links) out of each page.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Dorkscan operations
///
/// Per-URL and per-search-page failures never surface here; they are turned
/// into data (failed `CrawlResult`s, empty hit lists). Only configuration and
/// browser initialization problems terminate a run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser could not be initialized: {0}")]
    BrowserInit(#[source] browser::BrowserError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Domain {0} is excluded")]
    Excluded(String),
}

/// Result type alias for Dorkscan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, DorkOutcome, Engine, RunResult, SearchHit, Stats};
pub use extract::{extract, StructuredContent};
pub use url::{extract_domain, matches_wildcard, UrlFilter};
