//! Depth-bounded crawl of a single domain
//!
//! The engine keeps an explicit FIFO frontier of [`CrawlTask`]s instead of
//! recursing, so arbitrarily deep sites cannot grow the call stack. Up to
//! `page_concurrency` pages are in flight at once; they share the domain's
//! [`VisitedRegistry`] and [`RequestPacer`].
//!
//! A URL is claimed in the registry when it is queued, so the frontier holds
//! each URL at most once.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, RetryingFetcher, Transport};
use crate::crawler::parser::LinkExtractor;
use crate::state::{RequestPacer, VisitedRegistry};
use crate::url::{canonicalize, UrlClassifier};
use crate::ConfigError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A page waiting to be fetched, with its link distance from the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Counters describing one domain crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Pages that failed with a terminal error
    pub pages_failed: u32,
    /// Pages abandoned after exhausting rate-limit retries
    pub pages_rate_limited: u32,
    /// Pages never fetched because of the page cap or cancellation
    pub pages_skipped: u32,
}

/// What one domain crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub product_urls: BTreeSet<String>,
    pub stats: CrawlStats,
}

enum PageStatus {
    Fetched,
    Failed,
    RateLimited,
}

/// Contribution of one fetched page
struct PageReport {
    status: PageStatus,
    products: Vec<Url>,
    children: Vec<CrawlTask>,
}

impl PageReport {
    fn empty(status: PageStatus) -> Self {
        Self {
            status,
            products: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Crawls one domain; owns that domain's visited registry and pacer
///
/// An engine is single-use: its registry is never cleared, so a second
/// [`crawl`](Self::crawl) would skip everything already seen.
pub struct CrawlEngine {
    classifier: UrlClassifier,
    fetcher: RetryingFetcher,
    extractor: Arc<dyn LinkExtractor>,
    visited: VisitedRegistry,
    pacer: RequestPacer,
    max_depth: u32,
    page_concurrency: usize,
    max_pages: Option<u32>,
    cancel: CancellationToken,
}

impl CrawlEngine {
    /// Builds an engine for the domain rooted at `root`
    pub fn new(
        root: &Url,
        config: &Config,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn LinkExtractor>,
        cancel: CancellationToken,
    ) -> Result<Self, ConfigError> {
        let classifier = UrlClassifier::from_config(root, &config.classifier)?;
        let fetcher = RetryingFetcher::from_config(transport, &config.crawler, cancel.clone());

        Ok(Self {
            classifier,
            fetcher,
            extractor,
            visited: VisitedRegistry::new(),
            pacer: RequestPacer::for_concurrency(
                config.crawler.inter_request_delay(),
                config.crawler.page_concurrency,
            ),
            max_depth: config.crawler.max_depth,
            page_concurrency: config.crawler.page_concurrency.max(1),
            max_pages: config.crawler.max_pages_per_domain,
            cancel,
        })
    }

    pub fn visited(&self) -> &VisitedRegistry {
        &self.visited
    }

    /// Crawls from `root` and returns every product URL found within depth
    ///
    /// Page failures are absorbed: they are counted in the stats and
    /// contribute nothing, but never stop sibling or parent pages.
    pub async fn crawl(&self, root: &Url) -> CrawlReport {
        let mut report = CrawlReport::default();

        let root = match canonicalize(root.clone()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot crawl {}: {}", root, e);
                return report;
            }
        };

        self.visited.try_mark(root.as_str());
        let mut frontier = VecDeque::from([CrawlTask::new(root, 0)]);
        let mut in_flight = FuturesUnordered::new();
        let mut issued: u32 = 0;

        loop {
            while in_flight.len() < self.page_concurrency && !self.cancel.is_cancelled() {
                let Some(task) = frontier.pop_front() else {
                    break;
                };

                if task.depth > self.max_depth {
                    continue;
                }

                if self.max_pages.is_some_and(|cap| issued >= cap) {
                    tracing::debug!("Page cap reached, skipping {}", task.url);
                    report.stats.pages_skipped += 1;
                    continue;
                }

                issued += 1;
                in_flight.push(self.expand(task));
            }

            let Some(page) = in_flight.next().await else {
                break;
            };

            match page.status {
                PageStatus::Fetched => report.stats.pages_fetched += 1,
                PageStatus::Failed => report.stats.pages_failed += 1,
                PageStatus::RateLimited => report.stats.pages_rate_limited += 1,
            }
            report
                .product_urls
                .extend(page.products.into_iter().map(String::from));
            frontier.extend(page.children);
        }

        if self.cancel.is_cancelled() && !frontier.is_empty() {
            tracing::info!(
                "Crawl of {} cancelled with {} pages pending",
                self.classifier.target_host(),
                frontier.len()
            );
            report.stats.pages_skipped += frontier.len() as u32;
        }

        report
    }

    /// Fetches one page and classifies its links
    async fn expand(&self, task: CrawlTask) -> PageReport {
        self.pacer.wait_turn().await;
        tracing::debug!("Fetching {} (depth {})", task.url, task.depth);

        let outcome = self.fetcher.fetch(&task.url).await;
        self.pacer.finish(Instant::now());

        let (page_url, body) = match outcome {
            FetchOutcome::Success {
                final_url, body, ..
            } => (final_url, body),
            FetchOutcome::Exhausted { .. } => return PageReport::empty(PageStatus::RateLimited),
            FetchOutcome::Failed { .. } => return PageReport::empty(PageStatus::Failed),
        };

        let child_depth = task.depth + 1;
        let mut report = PageReport::empty(PageStatus::Fetched);

        for link in self.extractor.extract_links(&body, &page_url) {
            let Some(url) = self.classifier.resolve(&link, &page_url) else {
                continue;
            };

            if self.classifier.is_product(&url) {
                if child_depth <= self.max_depth {
                    report.products.push(url);
                }
            } else if child_depth < self.max_depth && self.visited.try_mark(url.as_str()) {
                // Pages at max_depth could only yield links beyond the bound
                report.children.push(CrawlTask::new(url, child_depth));
            }
        }

        tracing::debug!(
            "{}: {} product links, {} pages to follow",
            page_url,
            report.products.len(),
            report.children.len()
        );

        report
    }
}
