//! Browser capability used by the fetchers
//!
//! The engine never talks to a browser-automation library directly. It sees
//! three small traits:
//! - [`BrowserLauncher`] starts a shared [`Browser`] for one run
//! - [`Browser`] opens isolated [`PageContext`]s (tabs)
//! - [`PageContext`] navigates, exposes rendered HTML/title, and closes
//!
//! DOM queries run in-process over the rendered HTML via [`evaluate`], so
//! every backend gets them for free.

mod http;

#[cfg(feature = "chrome")]
mod chrome;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{build_http_client, HttpBrowser, HttpLauncher};

#[cfg(feature = "chrome")]
pub use chrome::{ChromeBrowser, ChromeLauncher};

use crate::config::{BrowserBackend, Config};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("page error: {0}")]
    Page(String),

    #[error("page context is closed")]
    Closed,
}

/// Navigation lifecycle event to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    /// The `load` event fired
    Load,
    /// The DOM was parsed
    #[default]
    DomContentLoaded,
    /// No network activity for a short period
    NetworkIdle,
}

/// Options for [`PageContext::navigate`]
#[derive(Debug, Clone, Copy)]
pub struct NavigateOptions {
    pub wait_until: WaitUntil,
    pub timeout: Duration,
}

impl NavigateOptions {
    pub fn new(wait_until: WaitUntil, timeout: Duration) -> Self {
        Self {
            wait_until,
            timeout,
        }
    }
}

/// Starts the browser shared by all fetches of a run
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError>;
}

/// A running browser; each fetch opens its own page context
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a fresh, isolated page context
    async fn new_page(&self) -> Result<Box<dyn PageContext>, BrowserError>;

    /// Shuts the browser down
    async fn close(&self) -> Result<(), BrowserError>;
}

/// One tab. Must be closed by whoever opened it.
#[async_trait]
pub trait PageContext: Send + Sync {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError>;

    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<(), BrowserError>;

    /// Rendered HTML of the current document
    async fn content(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    /// URL after redirects
    async fn url(&self) -> Result<String, BrowserError>;

    /// Waits up to `timeout` for `selector` to match; `Ok(false)` when it never does
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Runs a DOM query against the page's rendered HTML
///
/// The document is parsed after the content has been awaited, so the
/// non-`Send` DOM never lives across a suspension point.
pub async fn evaluate<T, F>(page: &dyn PageContext, query: F) -> Result<T, BrowserError>
where
    F: FnOnce(&Html) -> T,
{
    let html = page.content().await?;
    let document = Html::parse_document(&html);
    Ok(query(&document))
}

/// Picks the launcher matching the configured backend
pub fn launcher_for(config: &Config) -> Result<Box<dyn BrowserLauncher>, BrowserError> {
    match config.browser.backend {
        BrowserBackend::Http => Ok(Box::new(HttpLauncher::new(config.engine.fetch_timeout_ms))),
        #[cfg(feature = "chrome")]
        BrowserBackend::Chrome => Ok(Box::new(ChromeLauncher::new(config.browser.headless))),
        #[cfg(not(feature = "chrome"))]
        BrowserBackend::Chrome => Err(BrowserError::Launch(
            "the chrome backend requires building with `--features chrome`".to_string(),
        )),
    }
}

/// Parses the `<title>` of an HTML document
pub(crate) fn title_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    scraper::Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_html() {
        let html = "<html><head><title>  Acme Agency </title></head><body></body></html>";
        assert_eq!(title_from_html(html), "Acme Agency");
        assert_eq!(title_from_html("<p>no title</p>"), "");
    }

    #[test]
    fn test_launcher_for_http_backend() {
        assert!(launcher_for(&Config::default()).is_ok());
    }

    #[cfg(not(feature = "chrome"))]
    #[test]
    fn test_chrome_backend_needs_feature() {
        let mut config = Config::default();
        config.browser.backend = BrowserBackend::Chrome;
        assert!(matches!(launcher_for(&config), Err(BrowserError::Launch(_))));
    }

    #[tokio::test]
    async fn test_evaluate_runs_dom_query() {
        let browser = testing::ScriptedBrowser::new();
        browser.page(
            "https://a.test/",
            "<html><body><h1>One</h1><h1>Two</h1></body></html>",
        );
        let mut page = browser.new_page().await.unwrap();
        let options = NavigateOptions::new(WaitUntil::Load, Duration::from_secs(1));
        page.navigate("https://a.test/", options).await.unwrap();

        let count = evaluate(page.as_ref(), |doc| {
            let h1 = scraper::Selector::parse("h1").unwrap();
            doc.select(&h1).count()
        })
        .await
        .unwrap();
        assert_eq!(count, 2);
    }
}
