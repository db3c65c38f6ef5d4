use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Product-Trawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root URLs (scheme + host) to crawl, in output order
    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Maximum link depth from the domain root (root is depth 0)
    pub max_depth: u32,

    /// Number of domains crawled concurrently in one batch
    pub domain_parallelism: usize,

    /// Number of in-flight page fetches within one domain
    pub page_concurrency: usize,

    /// Optional cap on fetches issued per domain
    pub max_pages_per_domain: Option<u32>,

    /// Minimum time between request starts on the same domain (milliseconds)
    pub inter_request_delay_ms: u64,

    /// Per-request timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// Number of attempts allowed for a rate-limited page
    pub retry_limit: u32,

    /// Wait after an HTTP 429 before retrying (milliseconds)
    pub rate_limit_cooldown_ms: u64,
}

impl CrawlerConfig {
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            domain_parallelism: 5,
            page_concurrency: 1,
            max_pages_per_domain: None,
            inter_request_delay_ms: 1000,
            request_timeout_ms: 10_000,
            retry_limit: 3,
            rate_limit_cooldown_ms: 3000,
        }
    }
}

/// How a link's host is compared against the target domain's host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostMatch {
    /// Same host, or any subdomain of it
    #[default]
    ExactOrSubdomain,
    /// Host merely contains the target host; accepts look-alike domains
    Substring,
}

/// Product classification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Path fragments that mark a product page (e.g. "/product/")
    pub product_patterns: Vec<String>,

    /// Regular expressions tested against the URL path
    pub product_regexes: Vec<String>,

    pub host_match: HostMatch,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            product_patterns: vec![
                "/product/".to_string(),
                "/item/".to_string(),
                "/p/".to_string(),
            ],
            product_regexes: Vec::new(),
            host_match: HostMatch::default(),
        }
    }
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Path to the JSON results file
    pub results_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: "product_urls.json".to_string(),
        }
    }
}
