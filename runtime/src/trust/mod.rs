//! Trust layer: cleaning untrusted scraped content.

pub mod html_sanitizer;
