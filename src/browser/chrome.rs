//! Headless Chrome page backend (`chrome` feature)
//!
//! `headless_chrome` is a blocking API, so every call runs on the blocking
//! thread pool with its own clone of the tab handle.

use super::{Browser, BrowserError, BrowserLauncher, NavigateOptions, PageContext};
use async_trait::async_trait;
use headless_chrome::{LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;

/// Runs a blocking closure and flattens join errors into `BrowserError::Page`
async fn blocking<T, F>(f: F) -> Result<T, BrowserError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BrowserError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BrowserError::Page(format!("browser task panicked: {}", e)))?
}

/// Launches a local Chrome/Chromium
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
}

impl ChromeLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        let headless = self.headless;
        let browser = blocking(move || {
            let options = LaunchOptions::default_builder()
                .headless(headless)
                .sandbox(false)
                .build()
                .map_err(|e| BrowserError::Launch(e.to_string()))?;
            headless_chrome::Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))
        })
        .await?;

        tracing::info!("Launched Chrome (headless: {})", headless);
        Ok(Arc::new(ChromeBrowser { browser }))
    }
}

/// A running Chrome instance shared by all fetches of a run
pub struct ChromeBrowser {
    browser: headless_chrome::Browser,
}

#[async_trait]
impl Browser for ChromeBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageContext>, BrowserError> {
        let browser = self.browser.clone();
        let tab = blocking(move || {
            browser
                .new_tab()
                .map_err(|e| BrowserError::Page(format!("failed to open tab: {}", e)))
        })
        .await?;
        Ok(Box::new(ChromePage {
            tab: Some(tab),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        // The Chrome process exits when the last handle is dropped.
        Ok(())
    }
}

struct ChromePage {
    tab: Option<Arc<Tab>>,
}

impl ChromePage {
    fn tab(&self) -> Result<Arc<Tab>, BrowserError> {
        self.tab.clone().ok_or(BrowserError::Closed)
    }
}

#[async_trait]
impl PageContext for ChromePage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        let tab = self.tab()?;
        let user_agent = user_agent.to_string();
        blocking(move || {
            tab.set_user_agent(&user_agent, None, None)
                .map_err(|e| BrowserError::Page(e.to_string()))
        })
        .await
    }

    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<(), BrowserError> {
        let tab = self.tab()?;
        let target = url.to_string();
        let timeout = options.timeout;

        let navigation = blocking(move || {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&target)
                .and_then(|tab| tab.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| BrowserError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })
        });

        // The tab timeout covers each CDP wait; this bounds the whole navigation.
        match tokio::time::timeout(timeout + Duration::from_secs(1), navigation).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn content(&self) -> Result<String, BrowserError> {
        let tab = self.tab()?;
        blocking(move || tab.get_content().map_err(|e| BrowserError::Page(e.to_string()))).await
    }

    async fn title(&self) -> Result<String, BrowserError> {
        let tab = self.tab()?;
        blocking(move || tab.get_title().map_err(|e| BrowserError::Page(e.to_string()))).await
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.tab()?.get_url())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let tab = self.tab()?;
        let selector = selector.to_string();
        blocking(move || {
            Ok(tab
                .wait_for_element_with_custom_timeout(&selector, timeout)
                .is_ok())
        })
        .await
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        let Some(tab) = self.tab.take() else {
            return Ok(());
        };
        blocking(move || {
            tab.close(true)
                .map(|_| ())
                .map_err(|e| BrowserError::Page(e.to_string()))
        })
        .await
    }
}
