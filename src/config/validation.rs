use crate::config::types::{ClassifierConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_domains(&config.domains)?;
    validate_crawler_config(&config.crawler)?;
    validate_classifier_config(&config.classifier)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the list of target domains
fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "at least one domain must be configured".to_string(),
        ));
    }

    for domain in domains {
        let url = Url::parse(domain)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", domain, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain '{}' must use http or https",
                domain
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain '{}' has no host",
                domain
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.domain_parallelism < 1 || config.domain_parallelism > 100 {
        return Err(ConfigError::Validation(format!(
            "domain_parallelism must be between 1 and 100, got {}",
            config.domain_parallelism
        )));
    }

    if config.page_concurrency < 1 || config.page_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "page_concurrency must be between 1 and 64, got {}",
            config.page_concurrency
        )));
    }

    if config.max_pages_per_domain == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages_per_domain must be >= 1 when set".to_string(),
        ));
    }

    if config.retry_limit < 1 {
        return Err(ConfigError::Validation(
            "retry_limit must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 1, got {}",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates product matchers; every regex must compile
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.product_patterns.is_empty() && config.product_regexes.is_empty() {
        return Err(ConfigError::Validation(
            "at least one product pattern or regex is required".to_string(),
        ));
    }

    if config.product_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "Product pattern cannot be empty".to_string(),
        ));
    }

    for expr in &config.product_regexes {
        Regex::new(expr)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", expr, e)))?;
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
