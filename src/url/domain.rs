use url::Url;

/// Extracts the lowercase hostname from a parsed URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use dorkscan::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses a URL string and returns its hostname, or an empty string
///
/// Used for `CrawlResult::domain`, which must be populated even for URLs that
/// fail to load.
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| extract_domain(&u))
        .unwrap_or_default()
}
