use serde::{Deserialize, Serialize};

/// Main configuration structure for Dorkscan
///
/// Every section and key has a default, so an empty file (or no file at all)
/// yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub search: SearchConfig,
    pub crawl: CrawlConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Pacing, concurrency and retry knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Number of concurrent crawl workers within one batch
    pub concurrency: u32,

    /// Per-worker sleep after each successful fetch (milliseconds)
    pub per_request_delay_ms: u64,

    /// Hard timeout for a single page navigation (milliseconds)
    pub fetch_timeout_ms: u64,

    /// Settle delay after navigation so client-side rendering can finish
    pub settle_delay_ms: u64,

    /// Retries after the first failed attempt of a URL
    pub max_retries: u32,

    /// Cooldown between dorks (milliseconds)
    pub inter_dork_delay_ms: u64,

    /// Cooldown between search result pages of the same dork (milliseconds)
    pub inter_page_delay_ms: u64,

    /// Number of URLs per batch
    pub batch_size: usize,

    /// Cooldown between batches (milliseconds)
    pub inter_batch_delay_ms: u64,

    /// Safety cap on batches processed for one dork
    pub max_batches_per_dork: usize,

    /// Search result pages fetched per dork when the caller gives none
    pub max_pages: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            per_request_delay_ms: 1200,
            fetch_timeout_ms: 25_000,
            settle_delay_ms: 1000,
            max_retries: 2,
            inter_dork_delay_ms: 2000,
            inter_page_delay_ms: 2000,
            batch_size: 8,
            inter_batch_delay_ms: 3000,
            max_batches_per_dork: 15,
            max_pages: 1,
        }
    }
}

/// User agent selection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Pick a random agent from the pool for every page context
    pub rotation: bool,

    /// Agent used when rotation is disabled (falls back to the first pool entry)
    pub default: Option<String>,

    /// Candidate user agent strings
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            rotation: true,
            default: None,
            pool: default_user_agents(),
        }
    }
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Search engine description: where to send queries and how to read the SERP
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Search endpoint, e.g. `https://www.google.com/search`
    pub base_url: String,

    /// Query-string parameter carrying the search terms
    pub query_param: String,

    /// Query-string parameter carrying the result offset
    pub offset_param: String,

    /// Results per SERP page (offset step)
    pub results_per_page: u32,

    /// Selector that must be present once results have rendered
    pub results_container: String,

    /// Selector for one organic result block
    pub result: String,

    /// Selector (within a result) for the title
    pub title: String,

    /// Selector (within a result) for the outbound link
    pub link: String,

    /// Selector (within a result) for the snippet
    pub snippet: String,

    /// Selector (within a result) for the display URL
    pub display_url: String,

    /// Bounded wait for the results container (milliseconds)
    pub wait_timeout_ms: u64,

    /// Domains whose hits are never included (engine host is always excluded)
    pub excluded_domains: Vec<String>,

    /// Lowercase phrases that mark a CAPTCHA / blocked page
    pub blocked_markers: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            query_param: "q".to_string(),
            offset_param: "start".to_string(),
            results_per_page: 10,
            results_container: "#search".to_string(),
            result: "div.g".to_string(),
            title: "h3".to_string(),
            link: "a[href]".to_string(),
            snippet: "div.VwiC3b, span.aCOpRe, div[data-sncf]".to_string(),
            display_url: "cite".to_string(),
            wait_timeout_ms: 10_000,
            excluded_domains: vec!["*.google.com".to_string(), "*.youtube.com".to_string()],
            blocked_markers: vec![
                "unusual traffic".to_string(),
                "captcha".to_string(),
                "not a robot".to_string(),
            ],
        }
    }
}

/// Crawl-target validity rules
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Domains never crawled even if they appear in search hits
    pub excluded_domains: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            excluded_domains: [
                "*.facebook.com",
                "*.twitter.com",
                "*.instagram.com",
                "*.linkedin.com",
                "*.youtube.com",
                "*.tiktok.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Which page backend drives navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    /// Plain HTTP fetches; no script execution
    #[default]
    Http,
    /// Headless Chrome (requires the `chrome` feature)
    Chrome,
}

/// Browser capability settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub backend: BrowserBackend,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BrowserBackend::Http,
            headless: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to write the markdown report to
    pub report_path: Option<String>,

    /// Path to write the full run result as JSON
    pub json_path: Option<String>,

    /// Successful results rendered per dork in the report
    pub max_results_per_dork: usize,

    /// Length bound of the content preview in the report (characters)
    pub preview_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: None,
            json_path: None,
            max_results_per_dork: 5,
            preview_chars: 300,
        }
    }
}
