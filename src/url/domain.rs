use url::Url;

/// Extracts the lowercased host of a URL, port excluded
///
/// # Examples
///
/// ```
/// use url::Url;
/// use product_trawler::url::extract_host;
///
/// let url = Url::parse("https://WWW.Example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("www.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Removes a leading `www.` so that `www.shop.com` and `shop.com` compare equal
pub fn strip_www(host: &str) -> &str {
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_keeps_www() {
        let url = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("www.example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_host(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_no_host() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(extract_host(&url), None);
    }

    #[test]
    fn test_strip_www() {
        assert_eq!(strip_www("www.example.com"), "example.com");
        assert_eq!(strip_www("shop.example.com"), "shop.example.com");
        assert_eq!(strip_www("www."), "www.");
        assert_eq!(strip_www("wwwexample.com"), "wwwexample.com");
    }
}
