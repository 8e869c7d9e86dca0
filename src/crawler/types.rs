//! Data model produced by the engine
//!
//! Everything here is built bottom-up (crawl result, batch, dork, run) and is
//! not mutated after being handed to its parent. Serialized field names are
//! camelCase so the JSON matches what the calling UI layer consumes.

use crate::extract::StructuredContent;
use crate::output::Stats;
use crate::url::domain_of;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One organic search-engine result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// 1-based rank within its result page
    pub position: u32,
    pub title: String,
    pub url: String,
    pub display_url: String,
    pub snippet: String,
    pub timestamp: DateTime<Utc>,
    pub dork_used: String,
}

/// Outcome of crawling one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub content: StructuredContent,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub batch_id: String,
    pub dork_used: String,
    /// Fetch attempts spent on this URL, including the final one
    pub attempts: u32,
}

impl CrawlResult {
    /// A successfully fetched and extracted page
    pub fn succeeded(
        url: &str,
        title: String,
        content: StructuredContent,
        batch_id: &str,
        dork: &str,
        attempts: u32,
    ) -> Self {
        Self {
            url: url.to_string(),
            title,
            domain: domain_of(url),
            timestamp: Utc::now(),
            content,
            success: true,
            error: None,
            batch_id: batch_id.to_string(),
            dork_used: dork.to_string(),
            attempts,
        }
    }

    /// A URL that exhausted its retries; content is the canonical empty record
    pub fn failed(url: &str, error: String, batch_id: &str, dork: &str, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            domain: domain_of(url),
            timestamp: Utc::now(),
            content: StructuredContent::default(),
            success: false,
            error: Some(error),
            batch_id: batch_id.to_string(),
            dork_used: dork.to_string(),
            attempts,
        }
    }
}

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch_id: String,
    pub urls: Vec<String>,
    /// Completion order, not input order
    pub results: Vec<CrawlResult>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub success_count: usize,
    pub failure_count: usize,
    pub dork_used: String,
}

impl BatchResult {
    /// Finalizes a batch from its results
    pub fn finish(
        batch_id: String,
        urls: Vec<String>,
        results: Vec<CrawlResult>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        dork: &str,
    ) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        let failure_count = results.len() - success_count;
        let duration_ms = (end_time - start_time).num_milliseconds().max(0) as u64;

        Self {
            batch_id,
            urls,
            results,
            start_time,
            end_time,
            duration_ms,
            success_count,
            failure_count,
            dork_used: dork.to_string(),
        }
    }
}

/// Everything gathered for one dork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DorkOutcome {
    pub dork: String,
    pub search_results: Vec<SearchHit>,
    pub crawl_results: Vec<CrawlResult>,
    pub batches: Vec<BatchResult>,
    pub total_results: usize,
    pub successful_crawls: usize,
    pub failed_crawls: usize,
    pub summary: String,
}

impl DorkOutcome {
    pub fn successful(&self) -> impl Iterator<Item = &CrawlResult> {
        self.crawl_results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CrawlResult> {
        self.crawl_results.iter().filter(|r| !r.success)
    }
}

/// Cross-dork view of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResults {
    pub all_search_results: Vec<SearchHit>,
    /// Successful crawls only, in processing order
    pub crawled_records: Vec<CrawlResult>,
    pub text: String,
}

/// Aggregate of a whole invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub query: String,
    pub dork_results: Vec<DorkOutcome>,
    pub combined: CombinedResults,
    pub stats: Stats,
    pub summary: String,
}
