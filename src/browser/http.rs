//! Plain-HTTP page backend
//!
//! Navigation is a GET request; the response body is the "rendered" HTML.
//! No scripts run, so `wait_until` and settle delays have nothing to wait for,
//! but pages that render server-side (most lead targets) extract fine.

use super::{
    title_from_html, Browser, BrowserError, BrowserLauncher, NavigateOptions, PageContext,
};
use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

/// Maximum redirect hops followed per navigation
const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client shared by every page context of a run
///
/// The user agent is set per request by the page context, so the client
/// carries none of its own.
///
/// # Example
///
/// ```
/// use dorkscan::browser::build_http_client;
///
/// let client = build_http_client(25_000).unwrap();
/// ```
pub fn build_http_client(fetch_timeout_ms: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_millis(fetch_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Launches an [`HttpBrowser`]
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    fetch_timeout_ms: u64,
}

impl HttpLauncher {
    pub fn new(fetch_timeout_ms: u64) -> Self {
        Self { fetch_timeout_ms }
    }
}

#[async_trait]
impl BrowserLauncher for HttpLauncher {
    async fn launch(&self) -> Result<Arc<dyn Browser>, BrowserError> {
        let client = build_http_client(self.fetch_timeout_ms)
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        Ok(Arc::new(HttpBrowser::new(client)))
    }
}

/// Browser whose tabs are independent HTTP request states
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageContext>, BrowserError> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            user_agent: None,
            loaded: None,
            closed: false,
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[derive(Debug)]
struct LoadedDocument {
    final_url: String,
    body: String,
}

#[derive(Debug)]
struct HttpPage {
    client: Client,
    user_agent: Option<String>,
    loaded: Option<LoadedDocument>,
    closed: bool,
}

impl HttpPage {
    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed {
            Err(BrowserError::Closed)
        } else {
            Ok(())
        }
    }

    fn document(&self) -> Result<&LoadedDocument, BrowserError> {
        self.ensure_open()?;
        self.loaded
            .as_ref()
            .ok_or_else(|| BrowserError::Page("no document loaded".to_string()))
    }
}

#[async_trait]
impl PageContext for HttpPage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.user_agent = Some(user_agent.to_string());
        Ok(())
    }

    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<(), BrowserError> {
        self.ensure_open()?;

        let mut request = self.client.get(url).timeout(options.timeout);
        if let Some(ua) = &self.user_agent {
            request = request.header(header::USER_AGENT, ua);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BrowserError::Timeout {
                    url: url.to_string(),
                    timeout_ms: options.timeout.as_millis() as u64,
                }
            } else {
                BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!("Loaded {} ({} bytes)", final_url, body.len());
        self.loaded = Some(LoadedDocument { final_url, body });
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.document()?.body.clone())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(title_from_html(&self.document()?.body))
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.document()?.final_url.clone())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let selector = Selector::parse(selector)
            .map_err(|e| BrowserError::Page(format!("invalid selector '{}': {:?}", selector, e)))?;
        let body = match &self.loaded {
            Some(doc) if !self.closed => &doc.body,
            _ => return Ok(false),
        };
        // Static HTML never changes after load, so one check decides it.
        let document = Html::parse_document(body);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.loaded = None;
        Ok(())
    }
}
