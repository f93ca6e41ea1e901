//! CLI subcommand implementations for the `sitewalk` binary.

pub mod discover_cmd;
pub mod output;
pub mod resolve_cmd;
pub mod robots_cmd;
pub mod sanitize_cmd;
pub mod serve_cmd;
pub mod site_cmd;

use crate::acquisition::http_client::{Fetcher, HttpClient};
use crate::cartography::resolver::SitemapResolver;
use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Build the shared HTTP client and a resolver on top of it.
pub fn build_resolver(config: &RuntimeConfig) -> Result<(Arc<dyn Fetcher>, SitemapResolver)> {
    let client = HttpClient::new(config.http.clone()).context("failed to build HTTP client")?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(client);
    let resolver = SitemapResolver::new(Arc::clone(&fetcher), config.resolve.clone());
    Ok((fetcher, resolver))
}
