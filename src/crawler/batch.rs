//! Batch scheduler
//!
//! Splits a dork's crawl targets into fixed-size batches and runs them one at
//! a time through the worker pool, cooling down between batches.

use crate::config::EngineConfig;
use crate::crawler::pool::CrawlWorkerPool;
use crate::crawler::types::BatchResult;
use crate::state::RunState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Batch sizing and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub batch_size: usize,
    /// Hard cap on batches per dork; URLs past it are not crawled
    pub max_batches: usize,
    pub inter_batch_delay: Duration,
}

impl BatchSettings {
    pub fn from_config(engine: &EngineConfig) -> Self {
        Self {
            batch_size: engine.batch_size,
            max_batches: engine.max_batches_per_dork,
            inter_batch_delay: Duration::from_millis(engine.inter_batch_delay_ms),
        }
    }
}

/// Splits `urls` into contiguous chunks of `batch_size` (the last may be shorter)
pub fn partition(urls: &[String], batch_size: usize) -> Vec<Vec<String>> {
    urls.chunks(batch_size.max(1)).map(<[String]>::to_vec).collect()
}

/// Runs batches sequentially through a worker pool
pub struct BatchScheduler {
    pool: Arc<CrawlWorkerPool>,
    settings: BatchSettings,
}

impl BatchScheduler {
    pub fn new(pool: Arc<CrawlWorkerPool>, settings: BatchSettings) -> Self {
        Self { pool, settings }
    }

    /// Crawls `urls` batch by batch for the current dork
    ///
    /// Batch ids come from `state`, so they restart at `batch-1` for every
    /// dork. Never two batches at once; no delay after the last one.
    pub async fn run(&self, state: &mut RunState, urls: &[String], dork: &str) -> Vec<BatchResult> {
        let mut chunks = partition(urls, self.settings.batch_size);
        if chunks.len() > self.settings.max_batches {
            let dropped: usize = chunks[self.settings.max_batches..]
                .iter()
                .map(Vec::len)
                .sum();
            tracing::warn!(
                "Dork {:?}: {} batch(es) exceed the cap of {}, leaving {} URL(s) uncrawled",
                dork,
                chunks.len() - self.settings.max_batches,
                self.settings.max_batches,
                dropped
            );
            chunks.truncate(self.settings.max_batches);
        }

        let total = chunks.len();
        let visited = state.visited();
        let mut batches = Vec::with_capacity(total);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let batch_id = state.next_batch_id();
            tracing::info!(
                "Starting {} of {} for {:?} ({} URL(s))",
                batch_id,
                total,
                dork,
                chunk.len()
            );

            let start = Utc::now();
            let results = self
                .pool
                .crawl_batch(&chunk, &batch_id, dork, &visited)
                .await;
            let end = Utc::now();

            let batch = BatchResult::finish(batch_id, chunk, results, start, end, dork);
            tracing::info!(
                "Finished {}: {} ok, {} failed in {}ms",
                batch.batch_id,
                batch.success_count,
                batch.failure_count,
                batch.duration_ms
            );
            batches.push(batch);

            if index + 1 < total && !self.settings.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_batch_delay).await;
            }
        }

        batches
    }
}
