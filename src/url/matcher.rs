use super::domain::strip_www;
use crate::config::HostMatch;
use regex::Regex;

/// Checks whether a link's host belongs to the target domain
///
/// Both hosts are lowercased, as returned by [`extract_host`](super::extract_host).
///
/// * [`HostMatch::ExactOrSubdomain`]: the same site, or a subdomain of the
///   target host as configured. A leading `www.` is ignored only for the
///   same-site comparison, so `www.example.com` accepts `example.com` and
///   `shop.www.example.com` but not `shop.example.com`.
/// * [`HostMatch::Substring`]: accepts any host containing the target (minus
///   `www.`), which includes look-alike domains.
///
/// # Examples
///
/// ```
/// use product_trawler::config::HostMatch;
/// use product_trawler::url::host_matches;
///
/// assert!(host_matches(HostMatch::ExactOrSubdomain, "example.com", "shop.example.com"));
/// assert!(!host_matches(HostMatch::ExactOrSubdomain, "example.com", "evil-example.com"));
/// assert!(host_matches(HostMatch::Substring, "example.com", "evil-example.com"));
/// ```
pub fn host_matches(mode: HostMatch, target: &str, candidate: &str) -> bool {
    let site = strip_www(target);
    if site.is_empty() {
        return false;
    }

    match mode {
        HostMatch::ExactOrSubdomain => {
            strip_www(candidate) == site || is_subdomain_of(candidate, target)
        }
        HostMatch::Substring => candidate.contains(site),
    }
}

fn is_subdomain_of(candidate: &str, parent: &str) -> bool {
    candidate.len() > parent.len()
        && candidate.ends_with(parent)
        && candidate.as_bytes()[candidate.len() - parent.len() - 1] == b'.'
}

/// A predicate over URL paths used to recognise product pages
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    fn matches(&self, path: &str) -> bool;
}

/// Matches paths containing a fixed fragment such as `/product/`
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    fragment: String,
}

impl SegmentMatcher {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

impl PathMatcher for SegmentMatcher {
    fn matches(&self, path: &str) -> bool {
        path.contains(&self.fragment)
    }
}

/// Matches paths against a regular expression
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(expr: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(expr)?,
        })
    }
}

impl PathMatcher for RegexMatcher {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}
