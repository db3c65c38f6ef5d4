use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters stripped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Lowercase the host (done by the parser), drop default ports
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 6. Sort remaining query parameters by key
/// 7. Remove empty query string (trailing ?)
///
/// The path is kept as served, trailing slash included, so that the
/// canonical URL still fetches the same resource.
///
/// # Examples
///
/// ```
/// use product_trawler::url::normalize_url;
///
/// let url = normalize_url("https://Shop.EXAMPLE.com/product/42?utm_source=x#reviews").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/product/42");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Applies normalization to an already parsed URL
pub fn canonicalize(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Stable sort keeps repeated keys in their original order
    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
