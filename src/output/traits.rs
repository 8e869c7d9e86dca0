//! Output handler trait and errors
//!
//! An output handler persists a finished [`RunResult`] somewhere (a markdown
//! report, a JSON document). Handlers run after the engine returns; a failing
//! handler never invalidates the run itself.

use crate::crawler::RunResult;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        OutputError::Format(err.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Something that records a finished run
pub trait OutputHandler: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Persists the run
    ///
    /// # Arguments
    ///
    /// * `run` - The finished run
    fn write_run(&self, run: &RunResult) -> OutputResult<()>;
}
