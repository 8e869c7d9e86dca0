//! Page fetcher
//!
//! This module loads one URL through the browser capability:
//! - Picking a user agent (random pool member when rotation is on)
//! - Opening a fresh page context per call
//! - Navigating under a hard timeout, then letting the page settle
//! - Capturing title, rendered HTML and final URL
//! - Closing the page context on every exit path

use crate::browser::{Browser, BrowserError, NavigateOptions, PageContext, WaitUntil};
use crate::config::{EngineConfig, UserAgentConfig};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A page load that failed for any reason (timeout, network, HTTP status,
/// blocked page). Always retryable from the worker pool's point of view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to fetch {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

impl FetchError {
    pub fn new(url: &str, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            message: message.into(),
        }
    }

    fn from_browser(url: &str, err: BrowserError) -> Self {
        Self::new(url, err.to_string())
    }
}

/// What a successful fetch returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub html: String,
    pub final_url: String,
}

/// Fixed set of user agents to present
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
    fallback: String,
    rotate: bool,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>, fallback: String, rotate: bool) -> Self {
        Self {
            agents,
            fallback,
            rotate,
        }
    }

    pub fn from_config(config: &UserAgentConfig) -> Self {
        let fallback = config
            .default
            .clone()
            .or_else(|| config.pool.first().cloned())
            .unwrap_or_else(|| format!("dorkscan/{}", env!("CARGO_PKG_VERSION")));
        Self::new(config.pool.clone(), fallback, config.rotation)
    }

    /// Random pool member when rotating, otherwise the fixed agent
    pub fn pick(&self) -> &str {
        if self.rotate {
            if let Some(agent) = self.agents.choose(&mut rand::thread_rng()) {
                return agent;
            }
        }
        &self.fallback
    }
}

/// Loads pages through a shared browser
pub struct PageFetcher {
    browser: Arc<dyn Browser>,
    user_agents: UserAgentPool,
    timeout: Duration,
    settle_delay: Duration,
}

impl PageFetcher {
    pub fn new(
        browser: Arc<dyn Browser>,
        user_agents: UserAgentPool,
        timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            browser,
            user_agents,
            timeout,
            settle_delay,
        }
    }

    pub fn from_config(
        browser: Arc<dyn Browser>,
        engine: &EngineConfig,
        user_agent: &UserAgentConfig,
    ) -> Self {
        Self::new(
            browser,
            UserAgentPool::from_config(user_agent),
            Duration::from_millis(engine.fetch_timeout_ms),
            Duration::from_millis(engine.settle_delay_ms),
        )
    }

    /// Fetches one page
    ///
    /// The page context is closed whether or not navigation succeeded, so a
    /// run of thousands of fetches never accumulates open tabs.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - Title, rendered HTML and final URL
    /// * `Err(FetchError)` - The underlying failure message
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut page = self
            .browser
            .new_page()
            .await
            .map_err(|e| FetchError::from_browser(url, e))?;

        let result = self.load(page.as_mut(), url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Closing page context for {} failed: {}", url, e);
        }

        result
    }

    async fn load(&self, page: &mut dyn PageContext, url: &str) -> Result<FetchedPage, FetchError> {
        page.set_user_agent(self.user_agents.pick())
            .await
            .map_err(|e| FetchError::from_browser(url, e))?;

        let options = NavigateOptions::new(WaitUntil::DomContentLoaded, self.timeout);
        match tokio::time::timeout(self.timeout, page.navigate(url, options)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(FetchError::from_browser(url, e)),
            Err(_) => {
                return Err(FetchError::new(
                    url,
                    format!("navigation timed out after {}ms", self.timeout.as_millis()),
                ))
            }
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::from_browser(url, e))?;
        let title = page
            .title()
            .await
            .map_err(|e| FetchError::from_browser(url, e))?;
        let final_url = page.url().await.unwrap_or_else(|_| url.to_string());

        tracing::debug!("Fetched {} ({} bytes, title {:?})", final_url, html.len(), title);
        Ok(FetchedPage {
            title,
            html,
            final_url,
        })
    }
}
