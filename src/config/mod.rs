//! Configuration module for Product-Trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; omitted values fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use product_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ClassifierConfig, Config, CrawlerConfig, HostMatch, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
