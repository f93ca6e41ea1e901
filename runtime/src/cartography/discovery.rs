//! Crawl-target discovery: robots.txt → sitemap declarations → page URLs.

use crate::acquisition::http_client::Fetcher;
use crate::cartography::resolver::{ResolveError, SitemapResolver};
use crate::cartography::robots::{parse_robots, Robots};
use crate::cartography::sitemap::SitemapUrl;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to resolve sitemap {sitemap}: {source}")]
    Resolve {
        sitemap: String,
        #[source]
        source: ResolveError,
    },
}

/// Everything learned about a crawl target.
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    pub base_url: String,
    /// Parsed robots.txt, if one could be fetched and parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots: Option<Robots>,
    /// Root sitemaps that were resolved.
    pub sitemaps: Vec<String>,
    pub urls: Vec<SitemapUrl>,
    /// URLs dropped because robots.txt disallows them for the requested agent.
    pub disallowed: usize,
    pub discovered_at: DateTime<Utc>,
}

/// Finds and resolves the sitemaps a site declares.
pub struct SiteDiscoverer {
    fetcher: Arc<dyn Fetcher>,
    resolver: SitemapResolver,
}

impl SiteDiscoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>, resolver: SitemapResolver) -> Self {
        Self { fetcher, resolver }
    }

    /// Discover every page URL a site publishes through its sitemaps.
    ///
    /// Sitemaps come from `Sitemap:` lines in robots.txt, falling back to
    /// `/sitemap.xml`. When `user_agent` is given, URLs that robots.txt
    /// disallows for that agent are dropped.
    pub async fn discover(
        &self,
        base_url: &str,
        user_agent: Option<&str>,
    ) -> Result<Discovery, DiscoveryError> {
        let base = Url::parse(base_url).map_err(|source| DiscoveryError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let robots = self.fetch_robots(&base).await;
        let sitemaps = sitemap_roots(&base, robots.as_ref())?;
        info!(base = %base, sitemaps = sitemaps.len(), "resolving declared sitemaps");

        let resolved = try_join_all(sitemaps.iter().map(|sitemap| async move {
            self.resolver
                .resolve_url(sitemap)
                .await
                .map_err(|source| DiscoveryError::Resolve {
                    sitemap: sitemap.clone(),
                    source,
                })
        }))
        .await?;

        let mut urls: Vec<SitemapUrl> = resolved.into_iter().flatten().collect();
        let mut disallowed = 0;
        if let (Some(agent), Some(robots)) = (user_agent, robots.as_ref()) {
            let before = urls.len();
            urls.retain(|u| is_crawlable(robots, agent, &u.loc));
            disallowed = before - urls.len();
        }

        info!(base = %base, urls = urls.len(), disallowed, "discovery complete");

        Ok(Discovery {
            base_url: base.to_string(),
            robots,
            sitemaps,
            urls,
            disallowed,
            discovered_at: Utc::now(),
        })
    }

    async fn fetch_robots(&self, base: &Url) -> Option<Robots> {
        let robots_url = base.join("/robots.txt").ok()?;
        let body = match self.fetcher.fetch(robots_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %robots_url, error = %e, "robots.txt unavailable");
                return None;
            }
        };

        match parse_robots(&body) {
            Ok(robots) => Some(robots),
            Err(e) => {
                warn!(url = %robots_url, error = %e, "ignoring unparseable robots.txt");
                None
            }
        }
    }
}

/// Sitemaps declared by robots.txt, or the conventional `/sitemap.xml`.
fn sitemap_roots(base: &Url, robots: Option<&Robots>) -> Result<Vec<String>, DiscoveryError> {
    match robots {
        Some(r) if !r.sitemaps.is_empty() => Ok(r.sitemaps.clone()),
        _ => base
            .join("/sitemap.xml")
            .map(|u| vec![u.to_string()])
            .map_err(|source| DiscoveryError::InvalidBaseUrl {
                url: base.to_string(),
                source,
            }),
    }
}

fn is_crawlable(robots: &Robots, agent: &str, loc: &str) -> bool {
    let Ok(url) = Url::parse(loc) else {
        return true;
    };
    let path = match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    };
    robots.is_allowed(agent, &path)
}
