//! Output module for run reports and exports
//!
//! This module handles:
//! - Aggregating run statistics
//! - Rendering the markdown report
//! - Exporting the full run as JSON

mod json;
mod report;
pub mod stats;
mod traits;

pub use json::{to_json_string, write_json, JsonOutputHandler};
pub use report::{format_report, truncate_chars, write_report, MarkdownReportHandler};
pub use stats::{print_statistics, Stats};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::OutputConfig;
use crate::crawler::RunResult;

/// Handlers for every output configured in `[output]`
pub fn handlers_for(config: &OutputConfig) -> Vec<Box<dyn OutputHandler>> {
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();
    if let Some(path) = &config.report_path {
        handlers.push(Box::new(MarkdownReportHandler::new(path, config.clone())));
    }
    if let Some(path) = &config.json_path {
        handlers.push(Box::new(JsonOutputHandler::new(path)));
    }
    handlers
}

/// Runs every handler, logging (not propagating) individual failures
///
/// # Returns
///
/// Number of handlers that failed
pub fn write_outputs(handlers: &[Box<dyn OutputHandler>], run: &RunResult) -> usize {
    let mut failures = 0;
    for handler in handlers {
        if let Err(e) = handler.write_run(run) {
            tracing::error!("{} output failed: {}", handler.name(), e);
            failures += 1;
        }
    }
    failures
}
