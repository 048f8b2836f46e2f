//! Link classification
//!
//! Decides whether an anchor on a page counts toward the internal link graph.
//! Rules are applied in order; the first rule that matches wins:
//!
//! 1. Self links and destinations already recorded from this page visit
//! 2. Anchors inside navigation or footer markup
//! 3. Cross-site destinations and in-page fragments
//!
//! Anything left is accepted.

use crate::crawler::document::Node;
use crate::url::{has_fragment, resolve_href, same_site};
use std::collections::HashSet;
use url::Url;

/// How many containing elements above the anchor are inspected for excluded classes
pub const ANCESTOR_DEPTH: usize = 5;

/// Class substrings marking structurally repeated link regions
const EXCLUDED_CLASS_MARKERS: [&str; 2] = ["footer", "nav"];

/// Outcome of classifying one anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClassification {
    /// Counts as an edge in the link graph
    Accepted,
    /// Points at the current page, or the destination was already recorded from it
    SkippedSelfOrDup,
    /// Sits inside a nav/footer region
    SkippedExcludedAncestor,
    /// Leaves the site or targets an in-page fragment
    SkippedCrossDomainOrFragment,
    /// The href could not be resolved to an absolute URL
    SkippedUnresolvable,
}

impl LinkClassification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Per-page classifier state
///
/// One instance lives for exactly one page visit; it remembers which
/// destinations were already accepted from that page.
pub struct LinkClassifier<'p> {
    page_url: &'p Url,
    base_netloc: &'p str,
    recorded: HashSet<String>,
}

impl<'p> LinkClassifier<'p> {
    pub fn new(page_url: &'p Url, base_netloc: &'p str) -> Self {
        Self {
            page_url,
            base_netloc,
            recorded: HashSet::new(),
        }
    }

    /// Classifies one anchor
    ///
    /// Returns the classification together with the resolved destination when
    /// resolution succeeded. Accepting a link marks its destination as recorded
    /// for the rest of this page visit.
    pub fn classify(&mut self, anchor: &Node<'_>) -> (LinkClassification, Option<Url>) {
        let resolved = match anchor.href().and_then(|href| resolve_href(self.page_url, href)) {
            Some(url) => url,
            None => return (LinkClassification::SkippedUnresolvable, None),
        };

        if resolved.as_str() == self.page_url.as_str() || self.recorded.contains(resolved.as_str())
        {
            return (LinkClassification::SkippedSelfOrDup, Some(resolved));
        }

        if is_excluded_by_ancestor(anchor) {
            return (LinkClassification::SkippedExcludedAncestor, Some(resolved));
        }

        if !same_site(&resolved, self.base_netloc) || has_fragment(&resolved) {
            return (
                LinkClassification::SkippedCrossDomainOrFragment,
                Some(resolved),
            );
        }

        self.recorded.insert(resolved.to_string());
        (LinkClassification::Accepted, Some(resolved))
    }
}

/// Returns true if the anchor or one of its nearest ancestors carries a nav/footer class
///
/// The anchor's own class attribute is checked first, then up to
/// [`ANCESTOR_DEPTH`] containing elements. Matching is a case-insensitive
/// substring test over the space-joined class list.
pub fn is_excluded_by_ancestor(anchor: &Node<'_>) -> bool {
    std::iter::once(*anchor)
        .chain(anchor.ancestors().take(ANCESTOR_DEPTH))
        .any(|node| {
            let classes = node.class_names().join(" ").to_lowercase();
            EXCLUDED_CLASS_MARKERS
                .iter()
                .any(|marker| classes.contains(marker))
        })
}
