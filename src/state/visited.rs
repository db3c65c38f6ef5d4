use dashmap::DashSet;

/// Domain-scoped set of absolute URLs already claimed for fetching
///
/// This is the single source of truth for deduplication inside one domain
/// crawl. Entries are never removed; the registry is dropped together with
/// the crawl that owns it.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically inserts `url` if absent
    ///
    /// Returns `true` only for the caller that added the URL, so at most one
    /// fetch is ever issued per URL even when siblings expand concurrently.
    pub fn try_mark(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
