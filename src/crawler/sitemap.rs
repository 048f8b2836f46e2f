//! Sitemap discovery and reconciliation
//!
//! After the primary traversal the site's `sitemap.xml` is fetched and every
//! `<loc>` it declares is compared against the visited set. Declared pages the
//! traversal never reached are handed back for a secondary processing pass.
//! A missing or malformed sitemap contributes nothing and never fails the run.

use crate::crawler::fetcher::Fetcher;
use crate::url::resolve_href;
use crate::SurveyError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use url::Url;

const SITEMAP_FILE: &str = "sitemap.xml";

/// Location of the sitemap for a crawl seeded at `base`
///
/// Resolved like a relative link, so a root seed such as
/// `https://example.com/` maps to `https://example.com/sitemap.xml`.
pub fn sitemap_url(base: &Url) -> Result<Url, url::ParseError> {
    base.join(SITEMAP_FILE)
}

/// Extracts every `<loc>` from a sitemap document
///
/// Namespace prefixes are ignored, text is trimmed, entries are resolved
/// against the sitemap URL, and duplicates are dropped keeping document order.
///
/// # Arguments
///
/// * `source_url` - The sitemap URL, used for resolution and error reporting
/// * `bytes` - Raw sitemap body
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Declared URLs in document order
/// * `Err(SurveyError::Parse)` - The document is not well-formed XML
pub fn parse_sitemap(source_url: &Url, bytes: &[u8]) -> Result<Vec<String>, SurveyError> {
    let parse_error = |message: String| SurveyError::Parse {
        url: source_url.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();
    let mut seen = HashSet::new();
    let mut locations = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let text = current.trim();
                if text.is_empty() {
                    continue;
                }
                match resolve_href(source_url, text) {
                    Some(url) => {
                        if seen.insert(url.to_string()) {
                            locations.push(url.to_string());
                        }
                    }
                    None => tracing::debug!("Ignoring unresolvable sitemap entry '{}'", text),
                }
            }
            Ok(Event::Text(t)) if in_loc => {
                let text = t.unescape().map_err(|e| parse_error(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::CData(c)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(locations)
}

/// Fetches and parses the sitemap for `base`
///
/// Failures are logged and yield an empty list.
pub async fn fetch_sitemap<F: Fetcher>(fetcher: &F, base: &Url) -> Vec<String> {
    let url = match sitemap_url(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot derive sitemap location from {}: {}", base, e);
            return Vec::new();
        }
    };

    tracing::info!("Looking for sitemap at {}", url);
    let body = match fetcher.fetch(url.as_str()).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to retrieve sitemap: {}", e);
            return Vec::new();
        }
    };

    match parse_sitemap(&url, &body) {
        Ok(locations) => {
            tracing::info!("Sitemap declares {} URLs", locations.len());
            locations
        }
        Err(e) => {
            tracing::warn!("Failed to parse sitemap: {}", e);
            Vec::new()
        }
    }
}

/// Computes the sitemap URLs that were never visited
///
/// # Arguments
///
/// * `fetcher` - Used to retrieve the sitemap
/// * `base` - The crawl seed
/// * `is_visited` - Membership test against the visited set
///
/// # Returns
///
/// Declared-but-unvisited URLs in sitemap order; disjoint from the visited set
pub async fn reconcile<F, V>(fetcher: &F, base: &Url, is_visited: V) -> Vec<String>
where
    F: Fetcher,
    V: Fn(&str) -> bool,
{
    let declared = fetch_sitemap(fetcher, base).await;
    let missing: Vec<String> = declared
        .into_iter()
        .filter(|url| !is_visited(url))
        .collect();

    tracing::info!(
        "Sitemap reconciliation found {} URLs not reached by links",
        missing.len()
    );
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sitemap() -> Url {
        Url::parse("https://example.com/sitemap.xml").unwrap()
    }

    #[test]
    fn test_sitemap_url_for_root_seed() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            sitemap_url(&base).unwrap().as_str(),
            "https://example.com/sitemap.xml"
        );
    }

    #[test]
    fn test_sitemap_url_without_trailing_slash() {
        let base = Url::parse("https://example.com").unwrap();
        assert_eq!(
            sitemap_url(&base).unwrap().as_str(),
            "https://example.com/sitemap.xml"
        );
    }

    #[test]
    fn test_parse_namespaced_urlset() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>  https://example.com/a  </loc><lastmod>2024-01-01</lastmod></url>
              <url><loc>https://example.com/b</loc></url>
              <url><loc>https://example.com/a</loc></url>
            </urlset>"#;

        let urls = parse_sitemap(&sitemap(), xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_parse_prefixed_loc_and_entities() {
        let xml = br#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sm:url><sm:loc>https://example.com/?a=1&amp;b=2</sm:loc></sm:url>
              <sm:url><sm:loc><![CDATA[https://example.com/c]]></sm:loc></sm:url>
            </sm:urlset>"#;

        let urls = parse_sitemap(&sitemap(), xml).unwrap();
        assert_eq!(
            urls,
            vec!["https://example.com/?a=1&b=2", "https://example.com/c"]
        );
    }

    #[test]
    fn test_bare_hash_loc_matches_plain_url() {
        let xml = br#"<urlset><url><loc>https://example.com/a#</loc></url><url><loc>https://example.com/a</loc></url></urlset>"#;
        let urls = parse_sitemap(&sitemap(), xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_similar_tag_names_ignored() {
        let xml = br#"<urlset><url><location>https://example.com/x</location><loc>https://example.com/y</loc></url></urlset>"#;
        let urls = parse_sitemap(&sitemap(), xml).unwrap();
        assert_eq!(urls, vec!["https://example.com/y"]);
    }

    #[test]
    fn test_empty_loc_skipped() {
        let xml = br#"<urlset><url><loc>   </loc></url><url><loc/></url></urlset>"#;
        assert!(parse_sitemap(&sitemap(), xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let xml = br#"<urlset><url><loc>https://example.com/a</url></urlset>"#;
        let result = parse_sitemap(&sitemap(), xml);
        assert!(matches!(result, Err(SurveyError::Parse { .. })));
    }
}
