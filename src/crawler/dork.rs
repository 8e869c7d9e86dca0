//! Dork processor
//!
//! Runs the result pages of one dork, turns the hits into crawl targets and
//! hands them to the batch scheduler.

use crate::crawler::batch::BatchScheduler;
use crate::crawler::search::SearchPageFetcher;
use crate::crawler::types::{DorkOutcome, SearchHit};
use crate::state::RunState;
use crate::url::UrlFilter;
use std::time::Duration;

/// Query actually sent to the search engine for a dork
pub fn search_query(query: &str, dork: &str) -> String {
    format!("{} {}", query.trim(), dork.trim()).trim().to_string()
}

/// One-line summary of a dork outcome
pub fn dork_summary(dork: &str, total_results: usize, successful_crawls: usize) -> String {
    format!(
        "Dork \"{}\": found {} search results, crawled {} pages.",
        dork, total_results, successful_crawls
    )
}

/// Search + crawl of a single dork
pub struct DorkProcessor {
    search: SearchPageFetcher,
    scheduler: BatchScheduler,
    crawl_filter: UrlFilter,
    inter_page_delay: Duration,
}

impl DorkProcessor {
    pub fn new(
        search: SearchPageFetcher,
        scheduler: BatchScheduler,
        crawl_filter: UrlFilter,
        inter_page_delay: Duration,
    ) -> Self {
        Self {
            search,
            scheduler,
            crawl_filter,
            inter_page_delay,
        }
    }

    /// Collects hits from `max_pages` result pages
    async fn collect_hits(&self, query: &str, dork: &str, max_pages: u32) -> Vec<SearchHit> {
        let per_page = self.search.results_per_page();
        let mut hits = Vec::new();

        for page in 0..max_pages {
            let offset = page.saturating_mul(per_page);
            let found = self.search.search(query, offset, dork).await;
            tracing::info!(
                "Dork {:?} page {}/{}: {} hit(s)",
                dork,
                page + 1,
                max_pages,
                found.len()
            );
            hits.extend(found);

            if page + 1 < max_pages && !self.inter_page_delay.is_zero() {
                tokio::time::sleep(self.inter_page_delay).await;
            }
        }

        hits
    }

    /// Processes one dork
    ///
    /// A dork without hits is not an error: it produces an outcome with empty
    /// lists and zero counts.
    pub async fn process(
        &self,
        state: &mut RunState,
        query: &str,
        dork: &str,
        max_pages: u32,
    ) -> DorkOutcome {
        let query = search_query(query, dork);
        tracing::info!("Processing dork {:?} as {:?}", dork, query);

        let search_results = self.collect_hits(&query, dork, max_pages).await;
        let targets = self
            .crawl_filter
            .filter_unique(search_results.iter().map(|hit| hit.url.as_str()));
        tracing::info!(
            "Dork {:?}: {} hit(s), {} crawl target(s)",
            dork,
            search_results.len(),
            targets.len()
        );

        let batches = self.scheduler.run(state, &targets, dork).await;
        let crawl_results: Vec<_> = batches
            .iter()
            .flat_map(|batch| batch.results.iter().cloned())
            .collect();
        let successful_crawls = crawl_results.iter().filter(|r| r.success).count();
        let failed_crawls = crawl_results.len() - successful_crawls;
        let total_results = search_results.len();

        DorkOutcome {
            dork: dork.to_string(),
            summary: dork_summary(dork, total_results, successful_crawls),
            search_results,
            crawl_results,
            batches,
            total_results,
            successful_crawls,
            failed_crawls,
        }
    }
}
