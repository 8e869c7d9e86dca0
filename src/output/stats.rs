//! Run statistics
//!
//! This module aggregates per-dork outcomes into run-level counters and
//! prints them for the CLI.

use crate::crawler::DorkOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Run-level counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Search hits across all dorks
    pub total_search_results: usize,

    /// Crawl results (successes plus failures) across all dorks
    pub total_crawled: usize,

    pub successful_crawls: usize,

    pub failed_crawls: usize,

    /// Distinct hostnames among all crawl results
    pub unique_domains: usize,

    pub total_batches: usize,

    /// Mean batch wall time, 0 when no batch ran
    pub average_batch_duration_ms: f64,

    pub dorks_processed: usize,

    /// Dorks whose search produced no hits (blocked or genuinely empty)
    pub zero_result_dorks: Vec<String>,
}

impl Stats {
    /// Aggregates counters over every dork of a run
    pub fn from_outcomes(outcomes: &[DorkOutcome]) -> Self {
        let mut stats = Stats {
            dorks_processed: outcomes.len(),
            ..Stats::default()
        };
        let mut domains = HashSet::new();
        let mut batch_time_ms: u64 = 0;

        for outcome in outcomes {
            stats.total_search_results += outcome.total_results;
            if outcome.total_results == 0 {
                stats.zero_result_dorks.push(outcome.dork.clone());
            }

            for result in &outcome.crawl_results {
                stats.total_crawled += 1;
                if result.success {
                    stats.successful_crawls += 1;
                } else {
                    stats.failed_crawls += 1;
                }
                if !result.domain.is_empty() {
                    domains.insert(result.domain.as_str());
                }
            }

            stats.total_batches += outcome.batches.len();
            batch_time_ms += outcome.batches.iter().map(|b| b.duration_ms).sum::<u64>();
        }

        stats.unique_domains = domains.len();
        if stats.total_batches > 0 {
            stats.average_batch_duration_ms = batch_time_ms as f64 / stats.total_batches as f64;
        }
        stats
    }

    /// Share of crawl results that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_crawled == 0 {
            0.0
        } else {
            (self.successful_crawls as f64 / self.total_crawled as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &Stats) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Dorks processed: {}", stats.dorks_processed);
    println!("  Search results: {}", stats.total_search_results);
    println!("  Pages crawled: {}", stats.total_crawled);
    println!("  Unique domains: {}", stats.unique_domains);
    println!();

    println!("Batches:");
    println!("  Total: {}", stats.total_batches);
    println!(
        "  Average duration: {:.2}s",
        stats.average_batch_duration_ms / 1000.0
    );
    println!();

    if !stats.zero_result_dorks.is_empty() {
        println!("Dorks Without Results ({}):", stats.zero_result_dorks.len());
        for dork in &stats.zero_result_dorks {
            println!("  - {}", dork);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} ok / {} failed of {} crawled)",
        stats.success_rate(),
        stats.successful_crawls,
        stats.failed_crawls,
        stats.total_crawled
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{BatchResult, CrawlResult};
    use crate::extract::StructuredContent;
    use chrono::{Duration, Utc};

    fn outcome(
        dork: &str,
        results: Vec<CrawlResult>,
        batch_ms: &[i64],
        hits: usize,
    ) -> DorkOutcome {
        let start = Utc::now();
        let batches = batch_ms
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                BatchResult::finish(
                    format!("batch-{}", i + 1),
                    vec![],
                    vec![],
                    start,
                    start + Duration::milliseconds(*ms),
                    dork,
                )
            })
            .collect();
        let successful_crawls = results.iter().filter(|r| r.success).count();
        DorkOutcome {
            dork: dork.to_string(),
            search_results: vec![],
            failed_crawls: results.len() - successful_crawls,
            crawl_results: results,
            batches,
            total_results: hits,
            successful_crawls,
            summary: String::new(),
        }
    }

    fn ok(url: &str, dork: &str) -> CrawlResult {
        CrawlResult::succeeded(
            url,
            "T".to_string(),
            StructuredContent::default(),
            "batch-1",
            dork,
            1,
        )
    }

    fn bad(url: &str, dork: &str) -> CrawlResult {
        CrawlResult::failed(url, "timeout".to_string(), "batch-1", dork, 3)
    }

    #[test]
    fn test_stats_from_outcomes() {
        let outcomes = vec![
            outcome(
                "site:a.com",
                vec![ok("https://a.com/1", "site:a.com"), bad("https://b.com/", "site:a.com")],
                &[1000, 3000],
                4,
            ),
            outcome("site:x.com", vec![], &[], 0),
            outcome("d3", vec![ok("https://a.com/2", "d3")], &[2000], 1),
        ];

        let stats = Stats::from_outcomes(&outcomes);
        assert_eq!(stats.dorks_processed, 3);
        assert_eq!(stats.total_search_results, 5);
        assert_eq!(stats.total_crawled, 3);
        assert_eq!(stats.successful_crawls, 2);
        assert_eq!(stats.failed_crawls, 1);
        assert_eq!(
            stats.successful_crawls + stats.failed_crawls,
            stats.total_crawled
        );
        assert_eq!(stats.unique_domains, 2);
        assert!(stats.unique_domains <= stats.total_crawled);
        assert_eq!(stats.total_batches, 3);
        assert!((stats.average_batch_duration_ms - 2000.0).abs() < f64::EPSILON);
        assert_eq!(stats.zero_result_dorks, vec!["site:x.com"]);
    }

    #[test]
    fn test_empty_run_stats() {
        let stats = Stats::from_outcomes(&[]);
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.success_rate(), 0.0);
    }
}
