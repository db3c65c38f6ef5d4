//! Cross-domain orchestration
//!
//! Domains are crawled in batches of `domain_parallelism`. Each domain runs
//! as its own tokio task with a private engine, registry, and pacer; only
//! the read-only configuration, transport, and extractor are shared. A batch
//! must finish completely before the next one starts.

use crate::config::{validate, Config};
use crate::crawler::engine::CrawlEngine;
use crate::crawler::fetcher::{build_http_client, ReqwestTransport, Transport};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::output::{DomainResult, ResultSink};
use crate::TrawlerError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs one crawl engine per target domain with bounded parallelism
pub struct Orchestrator {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator backed by reqwest and the HTML extractor
    ///
    /// The configuration is validated first, so a hand-built [`Config`] gets
    /// the same checks as one loaded from disk.
    pub fn new(config: Config) -> Result<Self, TrawlerError> {
        validate(&config)?;
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(ReqwestTransport::new(client)),
            Arc::new(HtmlLinkExtractor::new()),
        ))
    }

    /// Creates an orchestrator with caller-supplied transport and extractor
    pub fn with_collaborators(
        config: Config,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            extractor,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops every running and pending domain crawl
    ///
    /// Cancelled crawls still report what they found so far, and domains
    /// that never started report an empty result.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls every configured domain
    pub async fn run(&self) -> Vec<DomainResult> {
        self.crawl_all(&self.config.domains).await
    }

    /// Crawls every configured domain and hands the results to `sink`
    ///
    /// The results are returned as well, even though they were written.
    pub async fn run_into(
        &self,
        sink: &dyn ResultSink,
    ) -> Result<Vec<DomainResult>, TrawlerError> {
        let results = self.run().await;
        sink.write(&results)?;
        Ok(results)
    }

    /// Crawls `domains` and returns one result per domain, in input order
    pub async fn crawl_all(&self, domains: &[String]) -> Vec<DomainResult> {
        let batch_size = self.config.crawler.domain_parallelism.max(1);
        let mut results = Vec::with_capacity(domains.len());

        for (batch_index, batch) in domains.chunks(batch_size).enumerate() {
            tracing::info!(
                "Starting batch {} with {} domains",
                batch_index + 1,
                batch.len()
            );

            let handles: Vec<_> = batch
                .iter()
                .map(|domain| {
                    let task = crawl_domain(
                        domain.clone(),
                        Arc::clone(&self.config),
                        Arc::clone(&self.transport),
                        Arc::clone(&self.extractor),
                        self.cancel.clone(),
                    );
                    (domain.clone(), tokio::spawn(task))
                })
                .collect();

            // Awaiting in submission order keeps results in input order
            for (domain, handle) in handles {
                match handle.await {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        tracing::error!("Crawl task for {} failed: {}", domain, e);
                        results.push(DomainResult::empty(domain));
                    }
                }
            }
        }

        results
    }
}

/// Crawls one domain in isolation; never fails
async fn crawl_domain(
    domain: String,
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    cancel: CancellationToken,
) -> DomainResult {
    let root = match Url::parse(&domain) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!("Skipping invalid domain {}: {}", domain, e);
            return DomainResult::empty(domain);
        }
    };

    let engine = match CrawlEngine::new(&root, &config, transport, extractor, cancel) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::warn!("Skipping domain {}: {}", domain, e);
            return DomainResult::empty(domain);
        }
    };

    tracing::info!("Crawling domain {}", domain);
    let report = engine.crawl(&root).await;

    tracing::info!(
        "Finished {}: {} product URLs ({} pages fetched, {} failed, {} rate limited, {} skipped)",
        domain,
        report.product_urls.len(),
        report.stats.pages_fetched,
        report.stats.pages_failed,
        report.stats.pages_rate_limited,
        report.stats.pages_skipped
    );

    DomainResult::new(
        domain,
        report.product_urls.into_iter().collect(),
        report.stats,
    )
}
