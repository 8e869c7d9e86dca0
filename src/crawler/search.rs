//! Search page fetcher
//!
//! Loads one search-engine result page for a query and offset and turns its
//! organic results into [`SearchHit`]s. Any failure (navigation error, missing
//! results container, CAPTCHA/blocked page) yields an empty list: one bad
//! result page must never abort the dork it belongs to.

use crate::browser::{evaluate, Browser, NavigateOptions, PageContext, WaitUntil};
use crate::config::SearchConfig;
use crate::crawler::fetcher::UserAgentPool;
use crate::crawler::types::SearchHit;
use crate::extract::collapse_whitespace;
use crate::url::UrlFilter;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a result page produced no hits
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchPageError {
    #[error("search page navigation failed: {0}")]
    Navigation(String),

    #[error("search engine blocked the request ({0})")]
    Blocked(String),

    #[error("results container '{0}' never appeared")]
    MissingResults(String),

    #[error("invalid search configuration: {0}")]
    Config(String),
}

/// A result block as read off the page, before filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    pub url: String,
    pub display_url: String,
    pub snippet: String,
}

/// Builds the result-page URL for a query and result offset
///
/// # Example
///
/// ```
/// use dorkscan::config::SearchConfig;
/// use dorkscan::crawler::build_search_url;
///
/// let url = build_search_url(&SearchConfig::default(), "plumbers site:example.com", 10).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.google.com/search?q=plumbers+site%3Aexample.com&start=10"
/// );
/// ```
pub fn build_search_url(
    config: &SearchConfig,
    query: &str,
    offset: u32,
) -> Result<Url, url::ParseError> {
    let offset = offset.to_string();
    Url::parse_with_params(
        &config.base_url,
        &[
            (config.query_param.as_str(), query),
            (config.offset_param.as_str(), offset.as_str()),
        ],
    )
}

/// Unwraps engine click-through links (`/url?q=...`, `/url?url=...`)
pub fn decode_redirect(url: Url) -> Url {
    if !url.path().ends_with("/url") {
        return url;
    }
    url.query_pairs()
        .find(|(key, _)| key == "q" || key == "url")
        .and_then(|(_, target)| Url::parse(&target).ok())
        .unwrap_or(url)
}

fn compile(css: &str) -> Result<Selector, SearchPageError> {
    Selector::parse(css).map_err(|e| SearchPageError::Config(format!("'{}': {:?}", css, e)))
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// Reads organic result blocks out of a result page
///
/// Blocks without a title or a resolvable http(s) link are skipped.
pub fn parse_search_results(
    document: &Html,
    config: &SearchConfig,
    base: &Url,
) -> Result<Vec<RawHit>, SearchPageError> {
    let result = compile(&config.result)?;
    let title = compile(&config.title)?;
    let link = compile(&config.link)?;
    let snippet = compile(&config.snippet)?;
    let display = compile(&config.display_url)?;

    let mut hits = Vec::new();
    for block in document.select(&result) {
        let Some(title) = first_text(block, &title) else {
            continue;
        };
        let Some(href) = block
            .select(&link)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty() && !href.starts_with('#'))
        else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let target = decode_redirect(resolved);
        if target.scheme() != "http" && target.scheme() != "https" {
            continue;
        }

        let display_url = first_text(block, &display).unwrap_or_else(|| {
            format!(
                "{}{}",
                target.host_str().unwrap_or_default(),
                target.path().trim_end_matches('/')
            )
        });

        hits.push(RawHit {
            title,
            url: target.to_string(),
            display_url,
            snippet: first_text(block, &snippet).unwrap_or_default(),
        });
    }

    Ok(hits)
}

/// Fetches and parses search-engine result pages
pub struct SearchPageFetcher {
    browser: Arc<dyn Browser>,
    config: SearchConfig,
    user_agents: UserAgentPool,
    timeout: Duration,
    hit_filter: UrlFilter,
}

impl SearchPageFetcher {
    pub fn new(
        browser: Arc<dyn Browser>,
        config: SearchConfig,
        user_agents: UserAgentPool,
        timeout: Duration,
    ) -> Self {
        let hit_filter = UrlFilter::for_search_hits(&config);
        Self {
            browser,
            config,
            user_agents,
            timeout,
            hit_filter,
        }
    }

    pub fn results_per_page(&self) -> u32 {
        self.config.results_per_page
    }

    /// Runs one result page; never fails, returns no hits instead
    pub async fn search(&self, query: &str, offset: u32, dork: &str) -> Vec<SearchHit> {
        match self.try_search(query, offset, dork).await {
            Ok(hits) => {
                tracing::debug!(
                    "Search page '{}' @{} returned {} hit(s)",
                    query,
                    offset,
                    hits.len()
                );
                hits
            }
            Err(e) => {
                tracing::warn!("Search page '{}' @{} yielded no hits: {}", query, offset, e);
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        query: &str,
        offset: u32,
        dork: &str,
    ) -> Result<Vec<SearchHit>, SearchPageError> {
        let url = build_search_url(&self.config, query, offset)
            .map_err(|e| SearchPageError::Config(e.to_string()))?;

        let mut page = self
            .browser
            .new_page()
            .await
            .map_err(|e| SearchPageError::Navigation(e.to_string()))?;

        let result = self.read_page(page.as_mut(), &url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Closing search page context failed: {}", e);
        }

        let raw = result?;
        let captured = Utc::now();
        let hits = raw
            .into_iter()
            .enumerate()
            .filter(|(_, hit)| self.hit_filter.is_allowed(&hit.url))
            .map(|(index, hit)| SearchHit {
                position: index as u32 + 1,
                title: hit.title,
                url: hit.url,
                display_url: hit.display_url,
                snippet: hit.snippet,
                timestamp: captured,
                dork_used: dork.to_string(),
            })
            .collect();

        Ok(hits)
    }

    async fn read_page(
        &self,
        page: &mut dyn PageContext,
        url: &Url,
    ) -> Result<Vec<RawHit>, SearchPageError> {
        page.set_user_agent(self.user_agents.pick())
            .await
            .map_err(|e| SearchPageError::Navigation(e.to_string()))?;

        let options = NavigateOptions::new(WaitUntil::DomContentLoaded, self.timeout);
        match tokio::time::timeout(self.timeout, page.navigate(url.as_str(), options)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(SearchPageError::Navigation(e.to_string())),
            Err(_) => {
                return Err(SearchPageError::Navigation(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }

        let final_url = page.url().await.unwrap_or_default();
        if final_url.contains("/sorry/") {
            return Err(SearchPageError::Blocked(final_url));
        }

        let wait = Duration::from_millis(self.config.wait_timeout_ms);
        let ready = page
            .wait_for_selector(&self.config.results_container, wait)
            .await
            .map_err(|e| SearchPageError::Navigation(e.to_string()))?;

        if !ready {
            let html = page.content().await.unwrap_or_default().to_lowercase();
            if let Some(marker) = self
                .config
                .blocked_markers
                .iter()
                .find(|marker| html.contains(&marker.to_lowercase()))
            {
                return Err(SearchPageError::Blocked(marker.clone()));
            }
            return Err(SearchPageError::MissingResults(
                self.config.results_container.clone(),
            ));
        }

        let config = &self.config;
        evaluate(page, |doc| parse_search_results(doc, config, url))
            .await
            .map_err(|e| SearchPageError::Navigation(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{serp_html as serp, ScriptedBrowser};

    fn fetcher(browser: &ScriptedBrowser) -> SearchPageFetcher {
        SearchPageFetcher::new(
            Arc::new(browser.clone()),
            SearchConfig::default(),
            UserAgentPool::new(vec![], "Agent/1".to_string(), false),
            Duration::from_secs(5),
        )
    }

    fn search_url(query: &str, offset: u32) -> String {
        build_search_url(&SearchConfig::default(), query, offset)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_decode_redirect() {
        let wrapped =
            Url::parse("https://www.google.com/url?q=https://acme.com/contact&sa=U").unwrap();
        assert_eq!(decode_redirect(wrapped).as_str(), "https://acme.com/contact");

        let plain = Url::parse("https://acme.com/url-shortener").unwrap();
        assert_eq!(
            decode_redirect(plain).as_str(),
            "https://acme.com/url-shortener"
        );
    }

    #[test]
    fn test_parse_search_results() {
        let html = r#"<html><body><div id="search">
                <div class="g"><a href="/url?q=https://acme.com/&amp;sa=U"><h3>Acme Agency</h3></a>
                    <div class="VwiC3b">Full-service   digital
                    marketing.</div></div>
                <div class="g"><a href="https://beta.io/about"><h3>Beta</h3><cite>beta.io › about</cite></a></div>
                <div class="g"><h3>No link here</h3></div>
                <div class="g"><a href="https://nolink-title.com/"></a></div>
            </div></body></html>"#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://www.google.com/search").unwrap();
        let hits = parse_search_results(&document, &SearchConfig::default(), &base).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Acme Agency");
        assert_eq!(hits[0].url, "https://acme.com/");
        assert_eq!(hits[0].snippet, "Full-service digital marketing.");
        assert_eq!(hits[0].display_url, "acme.com");
        assert_eq!(hits[1].display_url, "beta.io › about");
        assert_eq!(hits[1].snippet, "");
    }

    #[tokio::test]
    async fn test_search_returns_filtered_hits_with_positions() {
        let browser = ScriptedBrowser::new();
        browser.page(
            &search_url("agency site:linkedin.com", 0),
            &serp(&[
                ("Acme", "https://acme.com/", "one"),
                ("Video", "https://www.youtube.com/watch?v=1", "two"),
                ("Beta", "https://beta.io/", "three"),
            ]),
        );

        let hits = fetcher(&browser)
            .search("agency site:linkedin.com", 0, "site:linkedin.com")
            .await;

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[0].url, "https://acme.com/");
        assert_eq!(hits[1].position, 3);
        assert_eq!(hits[1].title, "Beta");
        assert!(hits.iter().all(|h| h.dork_used == "site:linkedin.com"));
        assert_eq!(browser.open_now(), 0);
    }

    #[tokio::test]
    async fn test_blocked_page_yields_no_hits() {
        let browser = ScriptedBrowser::new();
        browser.page(
            &search_url("q", 0),
            "<html><body>Our systems have detected unusual traffic.</body></html>",
        );
        assert!(fetcher(&browser).search("q", 0, "d").await.is_empty());
        assert_eq!(browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_navigation_failure_yields_no_hits() {
        let browser = ScriptedBrowser::new();
        browser.broken(&search_url("q", 10));
        assert!(fetcher(&browser).search("q", 10, "d").await.is_empty());
        assert_eq!(browser.open_now(), 0);
    }

    #[tokio::test]
    async fn test_missing_container_yields_no_hits() {
        let browser = ScriptedBrowser::new();
        browser.page(&search_url("q", 0), "<html><body><p>Nothing</p></body></html>");
        assert!(fetcher(&browser).search("q", 0, "d").await.is_empty());
    }
}
