//! Crawl worker pool
//!
//! A fixed number of workers drain one shared queue of `(url, retries)`
//! items. Each worker fetches a page, extracts its content and reports a
//! [`CrawlResult`]. A failed fetch is pushed back onto the queue until its
//! retries run out, at which point a failed result is reported instead.
//!
//! Results are reported in completion order.

use crate::config::EngineConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::types::CrawlResult;
use crate::extract::Extractor;
use crate::state::VisitedSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Knobs of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Number of workers, and so the maximum number of open page contexts
    pub concurrency: usize,

    /// Extra attempts allowed after the first failed fetch of a URL
    pub max_retries: u32,

    /// Pause a worker takes after each fetch
    pub request_delay: Duration,
}

impl PoolSettings {
    pub fn from_config(engine: &EngineConfig) -> Self {
        Self {
            concurrency: engine.concurrency as usize,
            max_retries: engine.max_retries,
            request_delay: Duration::from_millis(engine.per_request_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkItem {
    url: String,
    retries: u32,
}

type WorkQueue = Arc<Mutex<VecDeque<WorkItem>>>;

/// Bounded set of concurrent crawl workers
pub struct CrawlWorkerPool {
    fetcher: Arc<PageFetcher>,
    extractor: Arc<Extractor>,
    settings: PoolSettings,
}

impl CrawlWorkerPool {
    pub fn new(
        fetcher: Arc<PageFetcher>,
        extractor: Arc<Extractor>,
        settings: PoolSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
        }
    }

    /// Crawls every URL of a batch
    ///
    /// A URL already claimed in `visited` (by this or an earlier batch of the
    /// same dork) is skipped without producing a result.
    ///
    /// # Arguments
    ///
    /// * `urls` - URLs of the batch
    /// * `batch_id` - Id stamped on every result
    /// * `dork` - Dork stamped on every result
    /// * `visited` - Visited set of the current dork
    ///
    /// # Returns
    ///
    /// One result per crawled URL, in completion order
    pub async fn crawl_batch(
        &self,
        urls: &[String],
        batch_id: &str,
        dork: &str,
        visited: &VisitedSet,
    ) -> Vec<CrawlResult> {
        if urls.is_empty() {
            return Vec::new();
        }

        let queue: WorkQueue = Arc::new(Mutex::new(
            urls.iter()
                .map(|url| WorkItem {
                    url: url.clone(),
                    retries: 0,
                })
                .collect(),
        ));

        let workers = self.settings.concurrency.clamp(1, urls.len());
        tracing::debug!(
            "{}: {} URL(s) across {} worker(s)",
            batch_id,
            urls.len(),
            workers
        );

        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();
        for id in 0..workers {
            let worker = Worker {
                id,
                queue: queue.clone(),
                fetcher: self.fetcher.clone(),
                extractor: self.extractor.clone(),
                settings: self.settings,
                visited: visited.clone(),
                batch_id: batch_id.to_string(),
                dork: dork.to_string(),
                results: results_tx.clone(),
            };
            tasks.spawn(worker.run());
        }
        drop(results_tx);

        let mut results = Vec::with_capacity(urls.len());
        while let Some(result) = results_rx.recv().await {
            results.push(result);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker in {} stopped abnormally: {}", batch_id, e);
            }
        }

        results
    }
}

struct Worker {
    id: usize,
    queue: WorkQueue,
    fetcher: Arc<PageFetcher>,
    extractor: Arc<Extractor>,
    settings: PoolSettings,
    visited: VisitedSet,
    batch_id: String,
    dork: String,
    results: mpsc::UnboundedSender<CrawlResult>,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = self.queue.lock().await.pop_front();
            let Some(item) = next else {
                break;
            };

            if item.retries == 0 && !self.visited.claim(&item.url) {
                tracing::debug!("worker {}: {} already visited, skipping", self.id, item.url);
                continue;
            }

            let attempts = item.retries + 1;
            match self.fetcher.fetch_page(&item.url).await {
                Ok(page) => {
                    let content = self.extractor.extract_page(&page.html, &page.final_url);
                    tracing::info!("Crawled {} (attempt {})", item.url, attempts);
                    self.report(CrawlResult::succeeded(
                        &item.url,
                        page.title,
                        content,
                        &self.batch_id,
                        &self.dork,
                        attempts,
                    ));
                    self.pause(self.settings.request_delay).await;
                }
                Err(e) if item.retries < self.settings.max_retries => {
                    tracing::warn!(
                        "Attempt {} for {} failed, requeueing: {}",
                        attempts,
                        item.url,
                        e.message
                    );
                    self.queue.lock().await.push_back(WorkItem {
                        url: item.url,
                        retries: attempts,
                    });
                    // linear backoff
                    self.pause(self.settings.request_delay * attempts).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Giving up on {} after {} attempt(s): {}",
                        item.url,
                        attempts,
                        e.message
                    );
                    self.report(CrawlResult::failed(
                        &item.url,
                        e.message,
                        &self.batch_id,
                        &self.dork,
                        attempts,
                    ));
                }
            }
        }
        tracing::trace!("worker {} in {} finished", self.id, self.batch_id);
    }

    fn report(&self, result: CrawlResult) {
        if self.results.send(result).is_err() {
            tracing::error!("Result collector for {} went away", self.batch_id);
        }
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
