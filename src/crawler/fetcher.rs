//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a browser-like user agent and timeouts
//! - The [`Transport`] seam that issues a single GET
//! - Retry logic for rate-limited (HTTP 429) responses
//! - Error classification into retryable and terminal outcomes

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A response as seen by the crawler
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub final_url: Url,
    /// Page body; empty for non-success responses
    pub body: String,
}

/// Errors raised by a transport before any usable response exists
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Issues a single GET request
///
/// Implementations must not retry; retrying is the job of [`RetryingFetcher`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings supplying the request timeout
///
/// # Example
///
/// ```no_run
/// use product_trawler::config::{CrawlerConfig, UserAgentConfig};
/// use product_trawler::crawler::build_http_client;
///
/// let client =
///     build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = crawler.request_timeout();

    Client::builder()
        .user_agent(user_agent.value.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let final_url = response.url().clone();

        // Only successful pages are worth downloading
        let body = if status.is_success() {
            response.text().await?
        } else {
            String::new()
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            final_url,
            body,
        })
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page fetched with a 2xx status
    Success {
        status: u16,
        /// Final URL after redirects; links on the page resolve against it
        final_url: Url,
        body: String,
    },

    /// Every allowed attempt was answered with HTTP 429
    Exhausted { attempts: u32 },

    /// Any other failure; never retried
    Failed { reason: String },
}

/// Fetches one page, retrying only on rate limiting
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Immediate → Success |
/// | HTTP 429 | Wait cooldown, retry while attempts < retry limit, else Exhausted |
/// | Any other HTTP status | Immediate → Failed |
/// | Timeout / connection / body error | Immediate → Failed |
///
/// A page that is always rate limited is requested `retry_limit` times and
/// incurs exactly `retry_limit` cooldown waits. The last wait still applies
/// so the next request to the domain backs off as well.
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn Transport>,
    retry_limit: u32,
    cooldown: Duration,
    cancel: CancellationToken,
}

impl RetryingFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        retry_limit: u32,
        cooldown: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            retry_limit,
            cooldown,
            cancel,
        }
    }

    pub fn from_config(
        transport: Arc<dyn Transport>,
        config: &CrawlerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self::new(
            transport,
            config.retry_limit,
            config.rate_limit_cooldown(),
            cancel,
        )
    }

    /// Fetches `url`, absorbing every failure into a [`FetchOutcome`]
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let mut attempts: u32 = 0;

        loop {
            let response = match self.transport.get(url).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Fetch failed for {}: {}", url, e);
                    return FetchOutcome::Failed {
                        reason: e.to_string(),
                    };
                }
            };

            let status = StatusCode::from_u16(response.status).ok();

            if status == Some(StatusCode::TOO_MANY_REQUESTS) {
                attempts += 1;
                tracing::info!(
                    "Rate limited on {} (attempt {}/{}), cooling down for {:?}",
                    url,
                    attempts,
                    self.retry_limit,
                    self.cooldown
                );

                tokio::select! {
                    _ = tokio::time::sleep(self.cooldown) => {}
                    _ = self.cancel.cancelled() => {
                        return FetchOutcome::Failed {
                            reason: "cancelled during rate-limit cooldown".to_string(),
                        };
                    }
                }

                if attempts < self.retry_limit {
                    continue;
                }

                tracing::warn!("Giving up on {} after {} rate-limited attempts", url, attempts);
                return FetchOutcome::Exhausted { attempts };
            }

            if status.map_or(false, |s| s.is_success()) {
                return FetchOutcome::Success {
                    status: response.status,
                    final_url: response.final_url,
                    body: response.body,
                };
            }

            tracing::warn!("Fetch failed for {}: HTTP {}", url, response.status);
            return FetchOutcome::Failed {
                reason: format!("HTTP {}", response.status),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays scripted responses and counts requests
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<u16, TransportError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<u16, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(429));
            next.map(|status| HttpResponse {
                status,
                final_url: url.clone(),
                body: if status == 200 { "<html></html>".to_string() } else { String::new() },
            })
        }
    }

    fn fetcher(transport: Arc<ScriptedTransport>, retry_limit: u32) -> RetryingFetcher {
        RetryingFetcher::new(
            transport,
            retry_limit,
            Duration::from_millis(3000),
            CancellationToken::new(),
        )
    }

    fn page() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timeout");
        assert!(TransportError::Connect("refused".into())
            .to_string()
            .contains("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(200)]);
        let outcome = fetcher(transport.clone(), 3).fetch(&page()).await;

        assert!(matches!(outcome, FetchOutcome::Success { status: 200, .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limit() {
        let transport = ScriptedTransport::new(vec![Ok(429), Ok(429), Ok(200)]);
        let start = Instant::now();
        let outcome = fetcher(transport.clone(), 3).fetch(&page()).await;

        assert!(matches!(outcome, FetchOutcome::Success { status: 200, .. }));
        assert_eq!(transport.calls(), 3);
        assert!(start.elapsed() >= Duration::from_millis(6000));
        assert!(start.elapsed() < Duration::from_millis(9000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_waits_exactly_retry_limit_cooldowns() {
        let transport = ScriptedTransport::new(vec![Ok(429), Ok(429), Ok(429), Ok(200)]);
        let start = Instant::now();
        let outcome = fetcher(transport.clone(), 3).fetch(&page()).await;

        assert_eq!(outcome, FetchOutcome::Exhausted { attempts: 3 });
        assert_eq!(transport.calls(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(9000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(12000), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_status_is_terminal() {
        for status in [403u16, 404, 500, 503] {
            let transport = ScriptedTransport::new(vec![Ok(status), Ok(200)]);
            let start = Instant::now();
            let outcome = fetcher(transport.clone(), 3).fetch(&page()).await;

            assert_eq!(
                outcome,
                FetchOutcome::Failed {
                    reason: format!("HTTP {}", status)
                }
            );
            assert_eq!(transport.calls(), 1);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_terminal() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout), Ok(200)]);
        let outcome = fetcher(transport.clone(), 3).fetch(&page()).await;

        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_error_stops_retrying() {
        let transport = ScriptedTransport::new(vec![
            Ok(429),
            Err(TransportError::Connect("reset".to_string())),
        ]);
        let outcome = fetcher(transport.clone(), 5).fetch(&page()).await;

        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_cooldown() {
        let transport = ScriptedTransport::new(vec![Ok(429)]);
        let cancel = CancellationToken::new();
        let fetcher = RetryingFetcher::new(
            transport.clone(),
            3,
            Duration::from_secs(60),
            cancel.clone(),
        );

        cancel.cancel();
        let outcome = fetcher.fetch(&page()).await;

        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert_eq!(transport.calls(), 1);
    }
}
