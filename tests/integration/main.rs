//! Integration tests for Product-Trawler

mod crawl_tests;
