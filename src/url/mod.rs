//! URL handling module for Site-Survey
//!
//! URLs are compared as exact strings after resolution against the page they
//! were found on. No further canonicalization is applied beyond what the `url`
//! crate's serializer does.

mod domain;

use ::url::Url;

pub use domain::{netloc, same_site};

/// Resolves an href against the page it appeared on
///
/// Returns `None` if the href is empty or cannot be joined into an absolute URL.
/// A bare trailing `#` is dropped, so `href="#"` resolves to the page itself.
pub fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = page_url.join(href).ok()?;
    strip_empty_fragment(&mut url);
    Some(url)
}

/// Removes a fragment that is present but empty (`https://a/b#`)
pub fn strip_empty_fragment(url: &mut Url) {
    if url.fragment() == Some("") {
        url.set_fragment(None);
    }
}

/// Returns true if the URL carries a non-empty fragment (an in-page anchor)
pub fn has_fragment(url: &Url) -> bool {
    url.fragment().is_some_and(|f| !f.is_empty())
}

/// Returns true if the URL uses the accepted transport scheme
pub fn has_scheme(url: &Url, scheme: &str) -> bool {
    url.scheme().eq_ignore_ascii_case(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    #[test]
    fn test_resolve_relative() {
        let url = resolve_href(&page(), "other").unwrap();
        assert_eq!(url.as_str(), "https://example.com/dir/other");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve_href(&page(), "/top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/top");
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve_href(&page(), "https://other.com/x").unwrap();
        assert_eq!(url.as_str(), "https://other.com/x");
    }

    #[test]
    fn test_resolve_bare_hash_is_the_page() {
        assert_eq!(resolve_href(&page(), "#").unwrap(), page());
        assert_eq!(
            resolve_href(&page(), "/dir/page#").unwrap().as_str(),
            "https://example.com/dir/page"
        );
        assert_eq!(
            resolve_href(&page(), "#top").unwrap().as_str(),
            "https://example.com/dir/page#top"
        );
    }

    #[test]
    fn test_strip_empty_fragment() {
        let mut url = Url::parse("https://example.com/#").unwrap();
        strip_empty_fragment(&mut url);
        assert_eq!(url.as_str(), "https://example.com/");

        let mut url = Url::parse("https://example.com/#top").unwrap();
        strip_empty_fragment(&mut url);
        assert_eq!(url.as_str(), "https://example.com/#top");
    }

    #[test]
    fn test_resolve_empty_href() {
        assert!(resolve_href(&page(), "").is_none());
        assert!(resolve_href(&page(), "   ").is_none());
    }

    #[test]
    fn test_resolve_invalid_href() {
        assert!(resolve_href(&page(), "http://[::1").is_none());
    }

    #[test]
    fn test_fragment_detection() {
        assert!(has_fragment(&Url::parse("https://example.com/a#top").unwrap()));
        assert!(!has_fragment(&Url::parse("https://example.com/a#").unwrap()));
        assert!(!has_fragment(&Url::parse("https://example.com/a").unwrap()));
    }

    #[test]
    fn test_scheme_check() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(has_scheme(&url, "https"));
        assert!(!has_scheme(&url, "http"));
    }
}
