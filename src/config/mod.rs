//! Configuration module for Dorkscan
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use dorkscan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dorkscan.toml")).unwrap();
//! println!("Crawling with {} workers", config.engine.concurrency);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{
    BrowserBackend, BrowserConfig, Config, CrawlConfig, EngineConfig, OutputConfig, SearchConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_dork_file, parse_dork_list,
};
pub use validation::validate;
