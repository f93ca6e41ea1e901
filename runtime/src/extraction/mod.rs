//! Extraction of structured data from crawled pages.
//!
//! Each configured site names CSS selectors for the product fields it
//! exposes; [`product::ProductExtractor`] applies them to fetched HTML.

pub mod product;
