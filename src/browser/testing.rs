//! Scripted in-memory browser for engine tests

use super::{
    title_from_html, Browser, BrowserError, BrowserLauncher, NavigateOptions, PageContext,
};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Route {
    Page(String),
    Flaky { failures_left: usize, html: String },
    Broken,
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<String, Route>,
    attempts: HashMap<String, usize>,
    navigations: Vec<String>,
    user_agents: Vec<String>,
    open: usize,
    max_open: usize,
    opened: usize,
    closed: usize,
    delay: Duration,
}

/// Fake browser serving canned HTML per exact URL
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedBrowser {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every navigation sleeps this long before answering
    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().delay = delay;
        self
    }

    pub(crate) fn page(&self, url: &str, html: &str) {
        self.route(url, Route::Page(html.to_string()));
    }

    /// Fails `failures` times, then serves `html`
    pub(crate) fn flaky(&self, url: &str, failures: usize, html: &str) {
        self.route(
            url,
            Route::Flaky {
                failures_left: failures,
                html: html.to_string(),
            },
        );
    }

    pub(crate) fn broken(&self, url: &str) {
        self.route(url, Route::Broken);
    }

    fn route(&self, url: &str, route: Route) {
        self.script
            .lock()
            .unwrap()
            .routes
            .insert(url.to_string(), route);
    }

    pub(crate) fn attempts(&self, url: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .attempts
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Navigated URLs in order
    pub(crate) fn navigations(&self) -> Vec<String> {
        self.script.lock().unwrap().navigations.clone()
    }

    pub(crate) fn user_agents(&self) -> Vec<String> {
        self.script.lock().unwrap().user_agents.clone()
    }

    pub(crate) fn max_open(&self) -> usize {
        self.script.lock().unwrap().max_open
    }

    pub(crate) fn open_now(&self) -> usize {
        self.script.lock().unwrap().open
    }

    pub(crate) fn opened(&self) -> usize {
        self.script.lock().unwrap().opened
    }

    pub(crate) fn closed(&self) -> usize {
        self.script.lock().unwrap().closed
    }

    pub(crate) fn launcher(&self) -> ScriptedLauncher {
        ScriptedLauncher {
            browser: Some(self.clone()),
        }
    }
}

/// Launcher handing out a [`ScriptedBrowser`], or failing when it has none
pub(crate) struct ScriptedLauncher {
    browser: Option<ScriptedBrowser>,
}

impl ScriptedLauncher {
    pub(crate) fn failing() -> Self {
        Self { browser: None }
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        match &self.browser {
            Some(browser) => Ok(Arc::new(browser.clone())),
            None => Err(BrowserError::Launch("no browser available".to_string())),
        }
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageContext>, BrowserError> {
        {
            let mut script = self.script.lock().unwrap();
            script.open += 1;
            script.opened += 1;
            script.max_open = script.max_open.max(script.open);
        }
        Ok(Box::new(ScriptedPage {
            script: self.script.clone(),
            current: None,
            closed: false,
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}

struct ScriptedPage {
    script: Arc<Mutex<Script>>,
    current: Option<(String, String)>,
    closed: bool,
}

impl ScriptedPage {
    fn html(&self) -> Result<&str, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        self.current
            .as_ref()
            .map(|(_, html)| html.as_str())
            .ok_or_else(|| BrowserError::Page("nothing loaded".to_string()))
    }
}

#[async_trait]
impl PageContext for ScriptedPage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        self.script
            .lock()
            .unwrap()
            .user_agents
            .push(user_agent.to_string());
        Ok(())
    }

    async fn navigate(&mut self, url: &str, _options: NavigateOptions) -> Result<(), BrowserError> {
        let (outcome, delay) = {
            let mut script = self.script.lock().unwrap();
            *script.attempts.entry(url.to_string()).or_insert(0) += 1;
            script.navigations.push(url.to_string());
            let delay = script.delay;
            let outcome = match script.routes.get_mut(url) {
                Some(Route::Page(html)) => Ok(html.clone()),
                Some(Route::Flaky {
                    failures_left,
                    html,
                }) => {
                    if *failures_left > 0 {
                        *failures_left -= 1;
                        Err("connection reset".to_string())
                    } else {
                        Ok(html.clone())
                    }
                }
                Some(Route::Broken) => Err("net::ERR_NAME_NOT_RESOLVED".to_string()),
                None => Err("no route".to_string()),
            };
            (outcome, delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match outcome {
            Ok(html) => {
                self.current = Some((url.to_string(), html));
                Ok(())
            }
            Err(message) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message,
            }),
        }
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.html()?.to_string())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(title_from_html(self.html()?))
    }

    async fn url(&self) -> Result<String, BrowserError> {
        self.html()?;
        Ok(self
            .current
            .as_ref()
            .map(|(url, _)| url.clone())
            .unwrap_or_default())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let selector = Selector::parse(selector)
            .map_err(|e| BrowserError::Page(format!("{:?}", e)))?;
        let found = match self.html() {
            Ok(html) => Html::parse_document(html).select(&selector).next().is_some(),
            Err(_) => false,
        };
        Ok(found)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if !self.closed {
            self.closed = true;
            let mut script = self.script.lock().unwrap();
            script.open -= 1;
            script.closed += 1;
        }
        Ok(())
    }
}

/// A minimal result page in the default search selectors' shape
///
/// Each entry is `(title, href, snippet)`.
pub(crate) fn serp_html(results: &[(&str, &str, &str)]) -> String {
    let blocks: String = results
        .iter()
        .map(|(title, href, snippet)| {
            format!(
                r#"<div class="g"><a href="{}"><h3>{}</h3><cite>{}</cite></a><div class="VwiC3b">{}</div></div>"#,
                href, title, href, snippet
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="search">{}</div></body></html>"#,
        blocks
    )
}
