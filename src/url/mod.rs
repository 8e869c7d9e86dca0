//! URL handling module for Dorkscan
//!
//! This module provides domain extraction, wildcard matching, and the two
//! independent URL filters the engine applies: one deciding which search hits
//! are kept, and one deciding which URLs are valid crawl targets.

mod domain;
mod matcher;

use crate::config::{CrawlConfig, SearchConfig};
use crate::{UrlError, UrlResult};
use std::collections::HashSet;
use url::Url;

// Re-export main functions
pub use domain::{domain_of, extract_domain};
pub use matcher::{matches_any, matches_wildcard};

/// Accepts http(s) URLs whose host is not on an exclusion list
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    excluded: Vec<String>,
}

impl UrlFilter {
    /// Creates a filter rejecting the given domain patterns
    pub fn new(excluded: Vec<String>) -> Self {
        Self { excluded }
    }

    /// Filter for search-hit inclusion
    ///
    /// Besides the configured patterns, the search engine's own host is always
    /// excluded: its links are navigation, not leads.
    pub fn for_search_hits(config: &SearchConfig) -> Self {
        let mut excluded = config.excluded_domains.clone();
        if let Some(host) = Url::parse(&config.base_url)
            .ok()
            .as_ref()
            .and_then(extract_domain)
        {
            excluded.push(host);
        }
        Self::new(excluded)
    }

    /// Filter for crawl-target validity
    pub fn for_crawl_targets(config: &CrawlConfig) -> Self {
        Self::new(config.excluded_domains.clone())
    }

    /// Parses and checks a single URL
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The URL is http(s), has a host, and is not excluded
    /// * `Err(UrlError)` - Why the URL was rejected
    pub fn check(&self, raw: &str) -> UrlResult<Url> {
        let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let domain = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
        if matches_any(&self.excluded, &domain) {
            return Err(UrlError::Excluded(domain));
        }

        Ok(url)
    }

    /// Returns true if the URL passes [`UrlFilter::check`]
    pub fn is_allowed(&self, raw: &str) -> bool {
        self.check(raw).is_ok()
    }

    /// Keeps valid URLs, dropping exact duplicates, in first-seen order
    pub fn filter_unique<'a, I>(&self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for raw in urls {
            let raw = raw.trim();
            match self.check(raw) {
                Ok(_) => {
                    if seen.insert(raw.to_string()) {
                        kept.push(raw.to_string());
                    }
                }
                Err(e) => tracing::debug!("Dropping candidate {}: {}", raw, e),
            }
        }

        kept
    }
}
