//! Crawler module for discovering product pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with rate-limit retry
//! - HTML link extraction
//! - The per-domain crawl engine
//! - Cross-domain orchestration

mod engine;
mod fetcher;
mod orchestrator;
mod parser;

pub use engine::{CrawlEngine, CrawlReport, CrawlStats, CrawlTask};
pub use fetcher::{
    build_http_client, FetchOutcome, HttpResponse, ReqwestTransport, RetryingFetcher, Transport,
    TransportError,
};
pub use orchestrator::Orchestrator;
pub use parser::{HtmlLinkExtractor, LinkExtractor};

use crate::config::Config;
use crate::output::DomainResult;
use crate::TrawlerError;

/// Runs a complete crawl over every configured domain
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client
/// 2. Crawl the configured domains in batches
/// 3. Return one result per domain, in configuration order
///
/// Use [`Orchestrator`] directly to get hold of the cancellation token.
pub async fn crawl(config: Config) -> Result<Vec<DomainResult>, TrawlerError> {
    let orchestrator = Orchestrator::new(config)?;
    Ok(orchestrator.run().await)
}
