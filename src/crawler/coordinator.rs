//! Crawl controller - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Breadth-first traversal of the frontier under the page budget
//! - Bounded-concurrency fetching, with results processed in dequeue order
//! - Per-page processing: text, metadata, link classification, graph updates
//! - Sitemap reconciliation once the traversal ends
//! - Cancellation between page boundaries

use crate::config::Config;
use crate::crawler::classifier::LinkClassifier;
use crate::crawler::document::Document;
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::metadata::{extract_page_record, extract_text, PageRecord};
use crate::crawler::sitemap::reconcile;
use crate::graph::LinkGraph;
use crate::output::{build_outputs, OutputHandler};
use crate::storage::RunStatus;
use crate::url::{netloc, strip_empty_fragment};
use crate::{ConfigError, SurveyError};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

/// Pages between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Engine settings derived from the configuration
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed: Url,
    /// Authority every counted link and frontier entry must share
    pub base_netloc: String,
    pub max_pages: usize,
    pub accepted_scheme: String,
    /// Upper bound on fetches in flight at once
    pub concurrency: usize,
    /// Build a [`PageRecord`] for every processed page
    pub collect_metadata: bool,
}

impl CrawlSettings {
    /// Sequential https-only settings for `seed`
    pub fn new(mut seed: Url, max_pages: usize) -> Result<Self, ConfigError> {
        strip_empty_fragment(&mut seed);
        let base_netloc = netloc(&seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("{} has no host", seed)))?;

        Ok(Self {
            seed,
            base_netloc,
            max_pages,
            accepted_scheme: "https".to_string(),
            concurrency: 1,
            collect_metadata: false,
        })
    }

    /// Builds settings from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let raw = config
            .crawler
            .seed_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("seed-url is required".to_string()))?;
        let seed =
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let mut settings = Self::new(seed, config.crawler.max_pages)?;
        settings.accepted_scheme = config.crawler.accepted_scheme.clone();
        settings.concurrency = config.crawler.concurrency.max(1);
        settings.collect_metadata = config.wants_page_records();
        Ok(settings)
    }
}

/// A URL abandoned after a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    pub url: String,
    pub message: String,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed_url: String,

    /// Processed pages in visit order, reconciled pages last
    pub visited: Vec<String>,

    /// Pages processed by the primary traversal; never exceeds the budget
    pub primary_visited: usize,

    pub link_graph: LinkGraph,

    /// Page records, empty unless metadata collection was enabled
    pub pages: Vec<PageRecord>,

    /// Pages reached only through sitemap reconciliation
    pub sitemap_only: Vec<String>,

    pub failures: Vec<CrawlFailure>,

    /// True if the crawl stopped early on request
    pub cancelled: bool,

    /// Set when an output sink failed and ended the run
    pub output_error: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Final status recorded for the run
    pub fn status(&self) -> RunStatus {
        if self.output_error.is_some() {
            RunStatus::Failed
        } else if self.cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        }
    }

    /// Visited pages, other than the seed, that no counted link points to
    pub fn orphan_pages(&self) -> Vec<&str> {
        self.visited
            .iter()
            .map(String::as_str)
            .filter(|url| *url != self.seed_url && !self.link_graph.is_destination(url))
            .collect()
    }
}

/// Mutable state of one crawl run
struct CrawlSession {
    frontier: Frontier,
    graph: LinkGraph,
    pages: Vec<PageRecord>,
    sitemap_only: Vec<String>,
    failures: Vec<CrawlFailure>,
    processed: usize,
    started: Instant,
}

impl CrawlSession {
    fn new(settings: &CrawlSettings) -> Self {
        Self {
            frontier: Frontier::new(
                settings.seed.clone(),
                &settings.base_netloc,
                settings.max_pages,
                &settings.accepted_scheme,
            ),
            graph: LinkGraph::new(),
            pages: Vec::new(),
            sitemap_only: Vec::new(),
            failures: Vec::new(),
            processed: 0,
            started: Instant::now(),
        }
    }

    fn record_failure(&mut self, url: &Url, error: SurveyError) {
        if error.is_per_url() {
            tracing::warn!("Abandoning {}: {}", url, error);
        } else {
            tracing::error!("Abandoning {} after unexpected error: {}", url, error);
        }
        self.failures.push(CrawlFailure {
            url: url.to_string(),
            message: error.to_string(),
        });
    }
}

/// The crawl engine
///
/// Generic over the [`Fetcher`] so the same traversal runs against the network
/// or an in-memory site.
pub struct Crawler<F: Fetcher> {
    settings: CrawlSettings,
    fetcher: Arc<F>,
    cancel: Arc<AtomicBool>,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(settings: CrawlSettings, fetcher: F) -> Self {
        Self {
            settings,
            fetcher: Arc::new(fetcher),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses an externally owned flag to request cancellation
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the crawl at the next page boundary once set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Runs the crawl to completion
    ///
    /// 1. Breadth-first traversal until the frontier or the budget is exhausted
    /// 2. Sitemap reconciliation (skipped when cancelled)
    /// 3. Link rows handed to `outputs`, then `outputs` finalized
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or was cancelled
    /// * `Err(SurveyError)` - An output sink failed; per-URL failures never end up here.
    ///   The sinks are still finalized with a `failed` report first.
    pub async fn run(&self, outputs: &mut dyn OutputHandler) -> Result<CrawlReport, SurveyError> {
        let started_at = Utc::now();
        let mut session = CrawlSession::new(&self.settings);

        tracing::info!(
            "Starting crawl of {} (budget {} pages, concurrency {})",
            self.settings.seed,
            self.settings.max_pages,
            self.settings.concurrency
        );

        let outcome = self.collect(&mut session, outputs).await;

        let report = CrawlReport {
            seed_url: self.settings.seed.to_string(),
            visited: session.frontier.visited().to_vec(),
            primary_visited: session.frontier.primary_visited(),
            link_graph: session.graph,
            pages: session.pages,
            sitemap_only: session.sitemap_only,
            failures: session.failures,
            cancelled: self.is_cancelled(),
            output_error: outcome.as_ref().err().map(ToString::to_string),
            started_at,
            finished_at: Utc::now(),
        };

        // Sinks are closed even after a failure, so the run row and summary reflect it
        let finalized = outputs.finalize(&report);
        if let Err(e) = outcome {
            if let Err(finalize_error) = finalized {
                tracing::warn!("Could not finalize outputs: {}", finalize_error);
            }
            tracing::error!("Crawl stopped by output failure: {}", e);
            return Err(e);
        }
        finalized?;

        tracing::info!(
            "Crawl finished: {} pages visited ({} via sitemap), {} links counted, {} failures in {:?}",
            report.visited.len(),
            report.sitemap_only.len(),
            report.link_graph.edge_count(),
            report.failures.len(),
            session.started.elapsed()
        );

        Ok(report)
    }

    /// Traversal, reconciliation and link rows; any sink error ends it
    async fn collect(
        &self,
        session: &mut CrawlSession,
        outputs: &mut dyn OutputHandler,
    ) -> Result<(), SurveyError> {
        self.traverse(session, outputs).await?;

        if self.is_cancelled() {
            tracing::info!("Crawl cancelled, skipping sitemap reconciliation");
        } else {
            self.reconcile_sitemap(session, outputs).await?;
        }

        outputs.record_links(&session.graph.export())?;
        Ok(())
    }

    async fn traverse(
        &self,
        session: &mut CrawlSession,
        outputs: &mut dyn OutputHandler,
    ) -> Result<(), SurveyError> {
        loop {
            if self.is_cancelled() {
                tracing::info!("Cancellation requested, stopping traversal");
                return Ok(());
            }

            let mut batch = Vec::with_capacity(self.settings.concurrency);
            while batch.len() < self.settings.concurrency {
                match session.frontier.next_url() {
                    Some(url) => batch.push(url),
                    None => break,
                }
            }

            if batch.is_empty() {
                if session.frontier.budget_exhausted() {
                    tracing::info!("Page budget of {} reached", self.settings.max_pages);
                } else {
                    tracing::info!("Frontier is empty, traversal complete");
                }
                return Ok(());
            }

            for (url, handle) in self.spawn_fetches(batch) {
                match join_fetch(&url, handle).await {
                    Ok(body) => {
                        session.frontier.complete(&url, true);
                        self.process_page(session, outputs, &url, &body, false)?;
                    }
                    Err(e) => {
                        session.frontier.complete(&url, false);
                        session.record_failure(&url, e);
                    }
                }
            }
        }
    }

    async fn reconcile_sitemap(
        &self,
        session: &mut CrawlSession,
        outputs: &mut dyn OutputHandler,
    ) -> Result<(), SurveyError> {
        let frontier = &session.frontier;
        let missing = reconcile(self.fetcher.as_ref(), &self.settings.seed, |url| {
            frontier.is_visited(url)
        })
        .await;

        let urls: Vec<Url> = missing
            .iter()
            .filter_map(|raw| match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Skipping sitemap entry {}: {}", raw, e);
                    None
                }
            })
            .collect();

        for chunk in urls.chunks(self.settings.concurrency.max(1)) {
            if self.is_cancelled() {
                tracing::info!("Cancellation requested, stopping reconciliation");
                return Ok(());
            }

            for (url, handle) in self.spawn_fetches(chunk.to_vec()) {
                match join_fetch(&url, handle).await {
                    Ok(body) => {
                        session.frontier.record_reconciled(url.as_str());
                        session.sitemap_only.push(url.to_string());
                        self.process_page(session, outputs, &url, &body, true)?;
                    }
                    Err(e) => session.record_failure(&url, e),
                }
            }
        }

        Ok(())
    }

    fn spawn_fetches(
        &self,
        urls: Vec<Url>,
    ) -> Vec<(Url, JoinHandle<Result<Vec<u8>, SurveyError>>)> {
        urls.into_iter()
            .map(|url| {
                tracing::debug!("Fetching {}", url);
                let fetcher = Arc::clone(&self.fetcher);
                let target = url.to_string();
                let handle = tokio::spawn(async move { fetcher.fetch(&target).await });
                (url, handle)
            })
            .collect()
    }

    /// Processes one fetched page
    ///
    /// Text and metadata go to the sinks, accepted links become graph edges,
    /// and (for traversal pages only) every resolved link is offered to the
    /// frontier. The parsed document never lives across an `.await`.
    fn process_page(
        &self,
        session: &mut CrawlSession,
        outputs: &mut dyn OutputHandler,
        url: &Url,
        body: &[u8],
        from_sitemap_only: bool,
    ) -> Result<(), SurveyError> {
        let document = Document::parse(body);

        outputs.record_text(url.as_str(), &extract_text(&document))?;

        if self.settings.collect_metadata {
            let record = extract_page_record(url.as_str(), &document, from_sitemap_only);
            outputs.record_page(&record)?;
            session.pages.push(record);
        }

        let mut classifier = LinkClassifier::new(url, &self.settings.base_netloc);
        let mut counted = 0;
        let mut enqueued = 0;

        for anchor in document.anchors() {
            let (classification, resolved) = classifier.classify(&anchor);
            let Some(destination) = resolved else {
                continue;
            };

            if classification.is_accepted() {
                session
                    .graph
                    .record_edge(url.as_str(), destination.as_str(), &anchor.text());
                counted += 1;
            } else {
                tracing::trace!("{} -> {}: {:?}", url, destination, classification);
            }

            if !from_sitemap_only && session.frontier.offer(&destination) {
                enqueued += 1;
            }
        }

        session.processed += 1;
        tracing::debug!(
            "Processed {}: {} links counted, {} new URLs queued",
            url,
            counted,
            enqueued
        );

        if session.processed % PROGRESS_INTERVAL == 0 {
            let elapsed = session.started.elapsed();
            tracing::info!(
                "Progress: {} pages processed, {} in frontier, {:.2} pages/sec",
                session.processed,
                session.frontier.frontier_size(),
                session.processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }

        Ok(())
    }
}

async fn join_fetch(
    url: &Url,
    handle: JoinHandle<Result<Vec<u8>, SurveyError>>,
) -> Result<Vec<u8>, SurveyError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => Err(SurveyError::Fetch {
            url: url.to_string(),
            message: format!("fetch task failed: {}", e),
        }),
    }
}

/// Runs a complete survey over HTTP
///
/// Builds the HTTP client and every configured sink, then crawls.
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `config_hash` - Hash recorded by the SQLite and summary sinks
/// * `cancel` - Set to stop the crawl at the next page boundary
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed or was cancelled
/// * `Err(SurveyError)` - Setup failed or an output sink failed
pub async fn run_survey(
    config: &Config,
    config_hash: &str,
    cancel: Arc<AtomicBool>,
) -> Result<CrawlReport, SurveyError> {
    let settings = CrawlSettings::from_config(config)?;
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout_secs),
    )?;
    let mut outputs = build_outputs(config, config_hash)?;

    let crawler = Crawler::new(settings, HttpFetcher::new(client)).with_cancel_flag(cancel);
    crawler.run(&mut outputs).await
}
