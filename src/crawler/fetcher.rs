//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests that follow redirects
//! - Error classification into fetch failures and HTTP status failures
//!
//! The engine only depends on the [`Fetcher`] trait, so tests can drive it
//! with an in-memory site.

use crate::config::UserAgentConfig;
use crate::SurveyError;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Retrieves the raw body behind a URL
///
/// Implementations perform a single attempt: any transport error, timeout or
/// non-2xx status is returned as an error and never retried.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SurveyError>> + Send;
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SurveyError>> + Send {
        let client = self.client.clone();
        let url = url.to_string();
        async move { fetch_url(&client, &url).await }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for one whole request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_survey::config::UserAgentConfig;
/// use site_survey::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(body)` |
/// | any other status after redirects | `SurveyError::Status` |
/// | timeout | `SurveyError::Fetch` ("request timeout") |
/// | connection / TLS / redirect-limit error | `SurveyError::Fetch` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<Vec<u8>, SurveyError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SurveyError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| classify_error(url, e))?;
    Ok(body.to_vec())
}

fn classify_error(url: &str, error: reqwest::Error) -> SurveyError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        format!("redirect error: {}", error)
    } else {
        error.to_string()
    };

    SurveyError::Fetch {
        url: url.to_string(),
        message,
    }
}
