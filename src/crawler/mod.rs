//! Crawler module: search, crawl and aggregation
//!
//! This module contains the core engine, bottom-up:
//! - Page fetching through the browser capability
//! - Search result page fetching and parsing
//! - A bounded worker pool with retries
//! - Sequential batch scheduling
//! - Per-dork processing and whole-run orchestration

mod batch;
mod dork;
mod fetcher;
mod orchestrator;
mod pool;
mod search;
mod types;

pub use batch::{partition, BatchScheduler, BatchSettings};
pub use dork::{dork_summary, search_query, DorkProcessor};
pub use fetcher::{FetchError, FetchedPage, PageFetcher, UserAgentPool};
pub use orchestrator::{combine, combined_header, run_summary, Engine};
pub use pool::{CrawlWorkerPool, PoolSettings};
pub use search::{
    build_search_url, decode_redirect, parse_search_results, RawHit, SearchPageError,
    SearchPageFetcher,
};
pub use types::{
    BatchResult, CombinedResults, CrawlResult, DorkOutcome, RunResult, SearchHit,
};

pub use crate::output::Stats;
