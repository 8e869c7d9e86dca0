//! Run orchestrator
//!
//! [`Engine`] owns everything a run needs: configuration, the browser
//! launcher and the content extractor. One call to [`Engine::run`]:
//! 1. Launches the browser (the only fatal failure)
//! 2. Processes each dork in order, sequentially, with an inter-dork delay
//! 3. Aggregates statistics, the combined view and the summary
//! 4. Shuts the browser down

use crate::browser::{launcher_for, Browser, BrowserLauncher};
use crate::config::{validate, validation::validate_max_pages, Config};
use crate::crawler::batch::{BatchScheduler, BatchSettings};
use crate::crawler::dork::DorkProcessor;
use crate::crawler::fetcher::{PageFetcher, UserAgentPool};
use crate::crawler::pool::{CrawlWorkerPool, PoolSettings};
use crate::crawler::search::SearchPageFetcher;
use crate::crawler::types::{CombinedResults, DorkOutcome, RunResult};
use crate::extract::Extractor;
use crate::output::Stats;
use crate::state::RunState;
use crate::url::UrlFilter;
use crate::ScanError;
use std::sync::Arc;
use std::time::Duration;

/// Header line preceding each page in the combined text
pub fn combined_header(title: &str, domain: &str, dork: &str) -> String {
    format!("=== {} ({}) [{}] ===", title, domain, dork)
}

/// Builds the cross-dork view from processed outcomes
pub fn combine(outcomes: &[DorkOutcome]) -> CombinedResults {
    let all_search_results = outcomes
        .iter()
        .flat_map(|o| o.search_results.iter().cloned())
        .collect();
    let crawled_records: Vec<_> = outcomes
        .iter()
        .flat_map(|o| o.successful().cloned())
        .collect();
    let text = crawled_records
        .iter()
        .map(|r| {
            format!(
                "{}\n{}",
                combined_header(&r.title, &r.domain, &r.dork_used),
                r.content.all_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    CombinedResults {
        all_search_results,
        crawled_records,
        text,
    }
}

/// Top-level, human-readable summary of a run
pub fn run_summary(query: &str, stats: &Stats) -> String {
    let mut summary = format!(
        "Query \"{}\": processed {} dork(s), found {} search results, crawled {} pages successfully ({} failed) across {} unique domains in {} batch(es), average batch time {:.1}s.",
        query,
        stats.dorks_processed,
        stats.total_search_results,
        stats.successful_crawls,
        stats.failed_crawls,
        stats.unique_domains,
        stats.total_batches,
        stats.average_batch_duration_ms / 1000.0
    );
    if !stats.zero_result_dorks.is_empty() {
        summary.push_str(&format!(
            " No search results for: {}.",
            stats.zero_result_dorks.join(", ")
        ));
    }
    summary
}

/// The search-and-crawl engine
pub struct Engine {
    config: Arc<Config>,
    launcher: Box<dyn BrowserLauncher>,
    extractor: Arc<Extractor>,
}

impl Engine {
    /// Creates an engine using the browser backend named in the config
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to run
    /// * `Err(ScanError::Config)` - The configuration is invalid
    /// * `Err(ScanError::BrowserInit)` - The configured backend is unavailable
    pub fn new(config: Config) -> Result<Self, ScanError> {
        validate(&config)?;
        let launcher = launcher_for(&config).map_err(ScanError::BrowserInit)?;
        Self::with_launcher(config, launcher)
    }

    /// Creates an engine around an explicit browser launcher
    pub fn with_launcher(
        config: Config,
        launcher: Box<dyn BrowserLauncher>,
    ) -> Result<Self, ScanError> {
        validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            launcher,
            extractor: Arc::new(Extractor::default()),
        })
    }

    /// Replaces the content extractor
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    fn dork_processor(&self, browser: Arc<dyn Browser>) -> DorkProcessor {
        let config = &self.config;
        let user_agents = UserAgentPool::from_config(&config.user_agent);
        let timeout = Duration::from_millis(config.engine.fetch_timeout_ms);

        let search = SearchPageFetcher::new(
            browser.clone(),
            config.search.clone(),
            user_agents.clone(),
            timeout,
        );
        let fetcher = PageFetcher::new(
            browser,
            user_agents,
            timeout,
            Duration::from_millis(config.engine.settle_delay_ms),
        );
        let pool = CrawlWorkerPool::new(
            Arc::new(fetcher),
            self.extractor.clone(),
            PoolSettings::from_config(&config.engine),
        );
        let scheduler =
            BatchScheduler::new(Arc::new(pool), BatchSettings::from_config(&config.engine));

        DorkProcessor::new(
            search,
            scheduler,
            UrlFilter::for_crawl_targets(&config.crawl),
            Duration::from_millis(config.engine.inter_page_delay_ms),
        )
    }

    /// Runs every dork against the base query
    ///
    /// # Arguments
    ///
    /// * `query` - Base query every dork is appended to
    /// * `dorks` - Dorks, processed in this order
    /// * `max_pages` - Result pages per dork; the configured default when `None`
    ///
    /// # Returns
    ///
    /// * `Ok(RunResult)` - One outcome per dork, in input order
    /// * `Err(ScanError)` - `max_pages` was out of range or the browser could not start
    pub async fn run(
        &self,
        query: &str,
        dorks: &[String],
        max_pages: Option<u32>,
    ) -> Result<RunResult, ScanError> {
        let max_pages = max_pages.unwrap_or(self.config.engine.max_pages);
        validate_max_pages(max_pages)?;

        let browser = self.launcher.launch().await.map_err(ScanError::BrowserInit)?;
        tracing::info!(
            "Run started: query {:?}, {} dork(s), {} page(s) each",
            query,
            dorks.len(),
            max_pages
        );

        let processor = self.dork_processor(browser.clone());
        let inter_dork_delay = Duration::from_millis(self.config.engine.inter_dork_delay_ms);
        let mut state = RunState::new();
        let mut dork_results = Vec::with_capacity(dorks.len());

        for (index, dork) in dorks.iter().enumerate() {
            state.begin_dork(dork);
            let outcome = processor.process(&mut state, query, dork, max_pages).await;
            tracing::info!("{}", outcome.summary);
            dork_results.push(outcome);

            if index + 1 < dorks.len() && !inter_dork_delay.is_zero() {
                tokio::time::sleep(inter_dork_delay).await;
            }
        }

        if let Err(e) = browser.close().await {
            tracing::warn!("Browser did not shut down cleanly: {}", e);
        }

        let stats = Stats::from_outcomes(&dork_results);
        let combined = combine(&dork_results);
        let summary = run_summary(query, &stats);
        tracing::info!("{}", summary);

        Ok(RunResult {
            query: query.to_string(),
            dork_results,
            combined,
            stats,
            summary,
        })
    }
}
