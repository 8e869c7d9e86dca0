//! JSON export of a whole run

use crate::crawler::RunResult;
use crate::output::traits::{OutputHandler, OutputResult};
use std::path::{Path, PathBuf};

/// Serializes a run as pretty-printed JSON (camelCase keys, RFC 3339 timestamps)
pub fn to_json_string(run: &RunResult) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

/// Writes the JSON export to `path`
pub fn write_json(run: &RunResult, path: &Path) -> OutputResult<()> {
    std::fs::write(path, to_json_string(run)?)?;
    tracing::info!("JSON export written to {}", path.display());
    Ok(())
}

/// Output handler writing the JSON export to a fixed path
pub struct JsonOutputHandler {
    path: PathBuf,
}

impl JsonOutputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for JsonOutputHandler {
    fn name(&self) -> &str {
        "json"
    }

    fn write_run(&self, run: &RunResult) -> OutputResult<()> {
        write_json(run, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CombinedResults, CrawlResult, DorkOutcome};
    use crate::extract::StructuredContent;
    use crate::output::Stats;

    fn sample_run() -> RunResult {
        let result = CrawlResult::succeeded(
            "https://acme.io/",
            "Acme".to_string(),
            StructuredContent {
                headings: vec!["Acme".to_string()],
                all_text: "Acme".to_string(),
                ..StructuredContent::default()
            },
            "batch-1",
            "site:acme.io",
            1,
        );
        let outcome = DorkOutcome {
            dork: "site:acme.io".to_string(),
            search_results: vec![],
            crawl_results: vec![result.clone()],
            batches: vec![],
            total_results: 1,
            successful_crawls: 1,
            failed_crawls: 0,
            summary: "s".to_string(),
        };
        let dork_results = vec![outcome];
        RunResult {
            query: "agency".to_string(),
            stats: Stats::from_outcomes(&dork_results),
            dork_results,
            combined: CombinedResults {
                all_search_results: vec![],
                crawled_records: vec![result],
                text: "=== Acme (acme.io) [site:acme.io] ===\nAcme".to_string(),
            },
            summary: "run".to_string(),
        }
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json_string(&sample_run()).unwrap()).unwrap();

        assert_eq!(json["query"], "agency");
        assert_eq!(json["stats"]["successfulCrawls"], 1);
        assert_eq!(json["stats"]["zeroResultDorks"], serde_json::json!([]));
        assert_eq!(json["dorkResults"][0]["dork"], "site:acme.io");
        assert_eq!(
            json["combined"]["crawledRecords"][0]["content"]["headings"][0],
            "Acme"
        );
        assert!(json["combined"]["crawledRecords"][0].get("error").is_none());
    }

    #[test]
    fn test_json_handler_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let run = sample_run();

        let handler = JsonOutputHandler::new(&path);
        assert_eq!(handler.name(), "json");
        handler.write_run(&run).unwrap();

        let back: RunResult =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, run);
    }
}
