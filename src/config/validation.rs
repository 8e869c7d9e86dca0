use crate::config::types::{
    Config, CrawlConfig, EngineConfig, OutputConfig, SearchConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent page contexts
const MAX_CONCURRENCY: u32 = 32;

/// Upper bound on retries per URL
const MAX_RETRIES: u32 = 10;

/// Upper bound on search result pages per dork
const MAX_PAGES: u32 = 20;

/// Upper bound on organic results per search page
const MAX_RESULTS_PER_PAGE: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_search_config(&config.search)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates engine pacing and concurrency
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.fetch_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 1000ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.max_batches_per_dork < 1 {
        return Err(ConfigError::Validation(
            "max_batches_per_dork must be >= 1".to_string(),
        ));
    }

    validate_max_pages(config.max_pages)?;

    Ok(())
}

/// Validates the number of search pages requested per dork
pub(crate) fn validate_max_pages(max_pages: u32) -> Result<(), ConfigError> {
    if max_pages < 1 || max_pages > MAX_PAGES {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGES, max_pages
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user agent pool entries cannot be empty".to_string(),
        ));
    }

    if config.rotation && config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user agent rotation requires a non-empty pool".to_string(),
        ));
    }

    if !config.rotation && config.default.is_none() && config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "no user agent configured: set `default` or provide a pool".to_string(),
        ));
    }

    Ok(())
}

/// Validates the search engine description
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "search base_url must be http(s), got '{}'",
            config.base_url
        )));
    }

    if config.query_param.is_empty() || config.offset_param.is_empty() {
        return Err(ConfigError::Validation(
            "query_param and offset_param cannot be empty".to_string(),
        ));
    }

    if config.results_per_page < 1 || config.results_per_page > MAX_RESULTS_PER_PAGE {
        return Err(ConfigError::Validation(format!(
            "results_per_page must be between 1 and {}, got {}",
            MAX_RESULTS_PER_PAGE, config.results_per_page
        )));
    }

    for (name, selector) in [
        ("results_container", &config.results_container),
        ("result", &config.result),
        ("title", &config.title),
        ("link", &config.link),
        ("snippet", &config.snippet),
        ("display_url", &config.display_url),
    ] {
        if scraper::Selector::parse(selector).is_err() {
            return Err(ConfigError::Validation(format!(
                "search selector {} is not valid CSS: '{}'",
                name, selector
            )));
        }
    }

    for pattern in &config.excluded_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates crawl-target exclusion patterns
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    for pattern in &config.excluded_domains {
        validate_domain_pattern(pattern)?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("report_path", &config.report_path),
        ("json_path", &config.json_path),
    ] {
        if matches!(path, Some(p) if p.is_empty()) {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.preview_chars < 1 {
        return Err(ConfigError::Validation(
            "preview_chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
