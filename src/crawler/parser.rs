//! HTML link extraction
//!
//! Extraction only collects candidate hrefs. Deciding whether a candidate is
//! in-domain, crawlable, or a product page is the classifier's job.

use scraper::{Html, Selector};
use url::Url;

/// Yields candidate link strings from page content
pub trait LinkExtractor: Send + Sync {
    /// Returns hrefs in document order; `base` is the page's own location
    fn extract_links(&self, body: &str, base: &Url) -> Vec<String>;
}

/// [`LinkExtractor`] for HTML documents
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">` tags, in document order
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Stylesheets, scripts, images and other embedded resources
///
/// When the document declares `<base href="...">`, relative hrefs are
/// resolved against it and returned as absolute URLs; otherwise hrefs are
/// returned as written.
#[derive(Debug, Clone, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        let declared_base = extract_base(&document, base);

        let selector = match Selector::parse("a[href], area[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        document
            .select(&selector)
            .filter(|element| element.value().attr("download").is_none())
            .filter_map(|element| element.value().attr("href"))
            .map(|href| match &declared_base {
                Some(doc_base) => doc_base
                    .join(href.trim())
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            })
            .collect()
    }
}

/// Returns the document's `<base href>` resolved against the page location
fn extract_base(document: &Html, page: &Url) -> Option<Url> {
    let selector = Selector::parse("base[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    page.join(href.trim()).ok()
}
