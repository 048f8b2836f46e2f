//! Crawl frontier and visited set
//!
//! This module handles:
//! - FIFO (breadth-first) ordering of URLs awaiting fetch
//! - Frontier dedup: a URL is enqueued at most once per crawl
//! - The visited set and page budget for the primary traversal
//! - Budget reservation for fetches that are still in flight

use crate::url::{has_fragment, has_scheme, same_site};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Breadth-first frontier with budget accounting
///
/// The budget check counts visited pages plus reserved in-flight fetches, so
/// with any number of concurrent fetches no more than `max_pages` distinct
/// URLs are ever fetched by the primary traversal.
#[derive(Debug)]
pub struct Frontier {
    /// URLs awaiting fetch, oldest first
    queue: VecDeque<Url>,

    /// Every URL that ever entered the queue
    seen: HashSet<String>,

    /// Processed pages in visit order
    visited: Vec<String>,

    /// Membership index for `visited`
    visited_set: HashSet<String>,

    /// Pages visited by the primary traversal (excludes reconciled pages)
    primary_visited: usize,

    /// Fetches handed out but not yet completed
    in_flight: usize,

    max_pages: usize,
    accepted_scheme: String,
    base_netloc: String,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The first URL to visit
    /// * `base_netloc` - Authority that outbound links must share to be enqueued
    /// * `max_pages` - Page budget for the primary traversal
    /// * `accepted_scheme` - The only scheme that may be fetched during traversal
    pub fn new(seed: Url, base_netloc: &str, max_pages: usize, accepted_scheme: &str) -> Self {
        let mut seen = HashSet::new();
        seen.insert(seed.to_string());

        Self {
            queue: VecDeque::from([seed]),
            seen,
            visited: Vec::new(),
            visited_set: HashSet::new(),
            primary_visited: 0,
            in_flight: 0,
            max_pages,
            accepted_scheme: accepted_scheme.to_string(),
            base_netloc: base_netloc.to_string(),
        }
    }

    /// Takes the next fetchable URL and reserves a slot of the budget for it
    ///
    /// URLs that are already visited, use another scheme, or carry a fragment
    /// are dropped here without consuming budget.
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - A URL to fetch; report back with [`Frontier::complete`]
    /// * `None` - The queue is empty or the budget is fully reserved
    pub fn next_url(&mut self) -> Option<Url> {
        while self.has_budget() {
            let url = self.queue.pop_front()?;

            if self.visited_set.contains(url.as_str()) {
                tracing::trace!("Skipping already visited {}", url);
                continue;
            }
            if !has_scheme(&url, &self.accepted_scheme) {
                tracing::debug!("Skipping {} (scheme is not {})", url, self.accepted_scheme);
                continue;
            }
            if has_fragment(&url) {
                tracing::debug!("Skipping {} (fragment reference)", url);
                continue;
            }

            self.in_flight += 1;
            return Some(url);
        }
        None
    }

    /// Releases the reservation made by [`Frontier::next_url`]
    ///
    /// A successful fetch joins the visited set; a failed one is abandoned and
    /// gives its budget slot back.
    pub fn complete(&mut self, url: &Url, fetched: bool) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if fetched && self.insert_visited(url.as_str()) {
            self.primary_visited += 1;
        }
    }

    /// Offers a discovered link to the frontier
    ///
    /// The link is appended only if it is same-site, uses the accepted scheme,
    /// has no fragment, and was never visited or enqueued before.
    ///
    /// # Returns
    ///
    /// `true` if the URL was enqueued
    pub fn offer(&mut self, url: &Url) -> bool {
        if !same_site(url, &self.base_netloc)
            || !has_scheme(url, &self.accepted_scheme)
            || has_fragment(url)
        {
            return false;
        }
        if self.visited_set.contains(url.as_str()) || self.seen.contains(url.as_str()) {
            return false;
        }

        self.seen.insert(url.to_string());
        self.queue.push_back(url.clone());
        true
    }

    /// Adds a page that was processed outside the traversal (sitemap reconciliation)
    ///
    /// Such pages join the visited set but do not count against the budget.
    pub fn record_reconciled(&mut self, url: &str) {
        self.insert_visited(url);
    }

    fn insert_visited(&mut self, url: &str) -> bool {
        if self.visited_set.insert(url.to_string()) {
            self.visited.push(url.to_string());
            true
        } else {
            false
        }
    }

    fn has_budget(&self) -> bool {
        self.primary_visited + self.in_flight < self.max_pages
    }

    /// Returns whether a URL has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited_set.contains(url)
    }

    /// Visited URLs in visit order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Number of pages visited by the primary traversal
    pub fn primary_visited(&self) -> usize {
        self.primary_visited
    }

    /// Returns the number of URLs waiting in the queue
    pub fn frontier_size(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns true once the budget is used up by completed visits
    pub fn budget_exhausted(&self) -> bool {
        self.primary_visited >= self.max_pages
    }
}
