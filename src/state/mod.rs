//! State module for tracking per-domain crawl progress
//!
//! # Components
//!
//! - `VisitedRegistry`: the set of URLs already claimed for fetching in one domain crawl
//! - `RequestPacer`: keeps a fixed delay between requests on one domain

mod pacer;
mod visited;

// Re-export main types
pub use pacer::{PacingMode, RequestPacer};
pub use visited::VisitedRegistry;
