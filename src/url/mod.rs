//! URL handling module for Product-Trawler
//!
//! This module provides URL normalization, host matching, product path
//! matchers, and the [`UrlClassifier`] that combines them.

mod domain;
mod matcher;
mod normalize;

use crate::config::{ClassifierConfig, HostMatch};
use crate::ConfigError;
use std::sync::Arc;
use url::Url;

// Re-export main functions
pub use domain::{extract_host, strip_www};
pub use matcher::{host_matches, PathMatcher, RegexMatcher, SegmentMatcher};
pub use normalize::{canonicalize, normalize_url};

/// Link schemes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves candidate links for one target domain and recognises product URLs
///
/// The classifier is immutable after construction and cheap to clone, so one
/// instance can be shared by every in-flight page of a domain crawl.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    target_host: String,
    host_match: HostMatch,
    matchers: Arc<[Box<dyn PathMatcher>]>,
}

impl UrlClassifier {
    /// Creates a classifier for `target_host` with an explicit matcher list
    pub fn new(
        target_host: impl Into<String>,
        host_match: HostMatch,
        matchers: Vec<Box<dyn PathMatcher>>,
    ) -> Self {
        Self {
            target_host: target_host.into(),
            host_match,
            matchers: matchers.into(),
        }
    }

    /// Builds a classifier for the domain rooted at `root` from configuration
    ///
    /// Segment patterns are tried before regexes, each in configured order.
    pub fn from_config(root: &Url, config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let target_host = extract_host(root).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Domain '{}' has no host", root))
        })?;

        let mut matchers: Vec<Box<dyn PathMatcher>> = config
            .product_patterns
            .iter()
            .map(|p| Box::new(SegmentMatcher::new(p.as_str())) as Box<dyn PathMatcher>)
            .collect();

        for expr in &config.product_regexes {
            let matcher = RegexMatcher::new(expr)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", expr, e)))?;
            matchers.push(Box::new(matcher));
        }

        Ok(Self::new(target_host, config.host_match, matchers))
    }

    pub fn target_host(&self) -> &str {
        &self.target_host
    }

    /// Resolves a raw link against `base` into a canonical in-domain URL
    ///
    /// Returns `None` for empty, fragment-only, non-navigational, malformed,
    /// non-http(s), or off-domain links. Such links are not errors.
    pub fn resolve(&self, link: &str, base: &Url) -> Option<Url> {
        let link = link.trim();

        if link.is_empty() || link.starts_with('#') {
            return None;
        }

        let lowered = link.to_ascii_lowercase();
        if SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            return None;
        }

        let absolute = base.join(link).ok()?;
        let canonical = canonicalize(absolute).ok()?;

        let host = extract_host(&canonical)?;
        if !host_matches(self.host_match, &self.target_host, &host) {
            tracing::trace!("Dropping off-domain link {}", canonical);
            return None;
        }

        Some(canonical)
    }

    /// Returns true if any product matcher accepts the URL's path
    pub fn is_product(&self, url: &Url) -> bool {
        let path = url.path();
        self.matchers.iter().any(|m| m.matches(path))
    }
}
