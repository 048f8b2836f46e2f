use url::Url;

/// Extracts the authority used for same-site comparisons
///
/// This is the lowercase host plus an explicit port when the URL carries one,
/// so `https://example.com:8443/` and `https://example.com/` are different sites.
/// Userinfo is never part of the result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_survey::url::netloc;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(netloc(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(netloc(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if both URLs share the same authority
pub fn same_site(url: &Url, base_netloc: &str) -> bool {
    netloc(url).is_some_and(|n| n == base_netloc)
}
