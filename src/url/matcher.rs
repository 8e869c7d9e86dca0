/// Checks if a domain matches a wildcard pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches the bare domain and any
///    subdomain depth ("blog.example.com", "api.v2.example.com")
///
/// Comparison is ASCII case-insensitive, so hostnames taken straight from
/// search results can be checked without normalizing them first.
///
/// # Examples
///
/// ```
/// use dorkscan::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.linkedin.com", "linkedin.com"));
/// assert!(matches_wildcard("*.linkedin.com", "uk.linkedin.com"));
/// assert!(matches_wildcard("*.linkedin.com", "WWW.LinkedIn.com"));
/// assert!(!matches_wildcard("*.linkedin.com", "notlinkedin.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}

/// Returns true when the domain matches at least one of the patterns
pub fn matches_any<S: AsRef<str>>(patterns: &[S], candidate: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_wildcard(pattern.as_ref(), candidate))
}
