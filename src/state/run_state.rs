use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// URLs already claimed by a worker during the current dork
///
/// Cloning yields another handle to the same set, so every worker of a batch
/// sees every claim.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A worker panicking mid-insert cannot leave the set half-updated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks the URL as taken; returns false if it already was
    pub fn claim(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// State owned by one engine run
#[derive(Debug, Default)]
pub struct RunState {
    visited: VisitedSet,
    batches_started: usize,
}

impl RunState {
    /// Starts with an empty visited set and no batches
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets per-dork state before a new dork is processed
    ///
    /// The same URL may be crawled once per dork, so the visited set does not
    /// carry over; batch numbering restarts at 1.
    pub fn begin_dork(&mut self, dork: &str) {
        self.visited.clear();
        self.batches_started = 0;
        tracing::debug!("State reset for dork {:?}", dork);
    }

    /// Handle shared with the workers of the next batch
    pub fn visited(&self) -> VisitedSet {
        self.visited.clone()
    }

    /// Allocates the id of the next batch of the current dork
    pub fn next_batch_id(&mut self) -> String {
        self.batches_started += 1;
        format!("batch-{}", self.batches_started)
    }
}
