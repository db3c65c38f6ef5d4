//! Output module for persisting crawl results
//!
//! This module handles:
//! - The per-domain result record
//! - The [`ResultSink`] seam for persistence
//! - Writing results as a JSON array

mod json;

pub use json::JsonFileSink;

use crate::crawler::CrawlStats;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize results: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Product URLs found for one input domain
///
/// Serialized as `{ "domain": ..., "productUrls": [...] }`. The crawl
/// counters travel along for logging but are not part of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainResult {
    /// The domain exactly as configured
    pub domain: String,

    /// Sorted, deduplicated product URLs
    #[serde(rename = "productUrls")]
    pub product_urls: Vec<String>,

    #[serde(skip)]
    pub stats: CrawlStats,
}

impl DomainResult {
    pub fn new(domain: impl Into<String>, product_urls: Vec<String>, stats: CrawlStats) -> Self {
        Self {
            domain: domain.into(),
            product_urls,
            stats,
        }
    }

    /// Result for a domain that produced nothing
    pub fn empty(domain: impl Into<String>) -> Self {
        Self::new(domain, Vec::new(), CrawlStats::default())
    }
}

/// Receives the final results once every domain has finished
pub trait ResultSink {
    fn write(&self, results: &[DomainResult]) -> OutputResult<()>;
}
