//! HTML document abstraction used by the crawl engine
//!
//! Wraps a parsed `scraper::Html` and exposes only what the engine needs:
//! - anchors in document order, with href and visible text
//! - a typed ancestor walk with class-name lookup
//! - first-match lookups for `<title>`, `<meta name="description">`, `<link rel="canonical">`
//! - heading and text-block extraction
//!
//! `scraper::Html` is not `Send`, so a `Document` must be created and dropped
//! without an `.await` in between.

use scraper::{ElementRef, Html, Selector};

/// Tags whose text makes up the extracted page text, matched in document order
const TEXT_BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li";

/// A parsed HTML page
pub struct Document {
    html: Html,
}

/// An element inside a [`Document`]
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl Document {
    /// Parses raw response bytes as an HTML document
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected; the HTML
    /// parser itself recovers from any malformed markup.
    ///
    /// # Example
    ///
    /// ```
    /// use site_survey::crawler::Document;
    ///
    /// let doc = Document::parse(b"<html><head><title>Test</title></head></html>");
    /// assert_eq!(doc.title(), Some("Test".to_string()));
    /// ```
    pub fn parse(bytes: &[u8]) -> Self {
        let source = String::from_utf8_lossy(bytes);
        Self {
            html: Html::parse_document(&source),
        }
    }

    /// Returns every `<a>` element in document order
    pub fn anchors(&self) -> Vec<Node<'_>> {
        self.select_all("a")
    }

    /// Returns the trimmed text of the first `<title>`
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|node| node.text())
    }

    /// Returns the `content` of the first `<meta name="description">`
    pub fn meta_description(&self) -> Option<String> {
        self.select_first(r#"meta[name="description"]"#)
            .and_then(|node| node.attr("content").map(str::to_string))
    }

    /// Returns the raw `href` of the first `<link rel="canonical">`
    pub fn canonical_href(&self) -> Option<String> {
        self.select_first(r#"link[rel~="canonical"]"#)
            .and_then(|node| node.attr("href").map(str::to_string))
    }

    /// Returns the trimmed text of the first `limit` elements named `tag`
    pub fn heading_texts(&self, tag: &str, limit: usize) -> Vec<String> {
        self.select_all(tag)
            .into_iter()
            .take(limit)
            .map(|node| node.text())
            .collect()
    }

    /// Returns the trimmed text of every paragraph, heading and list item
    pub fn text_blocks(&self) -> Vec<String> {
        self.select_all(TEXT_BLOCK_SELECTOR)
            .into_iter()
            .map(|node| node.text())
            .collect()
    }

    fn select_all(&self, css: &str) -> Vec<Node<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self
                .html
                .select(&selector)
                .map(|element| Node { element })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.html.select(&selector).next().map(|element| Node { element })
    }
}

impl<'a> Node<'a> {
    /// Lowercase tag name
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Looks up an attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// The `href` attribute, if present and non-empty
    pub fn href(&self) -> Option<&'a str> {
        self.attr("href").filter(|h| !h.trim().is_empty())
    }

    /// Concatenated descendant text, trimmed
    pub fn text(&self) -> String {
        self.element.text().collect::<String>().trim().to_string()
    }

    /// Class names from the `class` attribute
    pub fn class_names(&self) -> Vec<&'a str> {
        self.element.value().classes().collect()
    }

    /// Containing elements, nearest first, stopping at the document root
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> {
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .map(|element| Node { element })
    }
}
