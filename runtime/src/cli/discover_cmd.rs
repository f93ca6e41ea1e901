//! `sitewalk discover <base-url>`: find a site's sitemaps through robots.txt and resolve them.

use crate::cartography::discovery::{Discovery, SiteDiscoverer};
use crate::cli::output::{self, Styled};
use crate::config::RuntimeConfig;
use anyhow::Result;
use std::time::Instant;

/// Run the discover command.
pub async fn run(base_url: &str, agent: Option<&str>, config: &RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    if !output::is_quiet() && !output::is_json() {
        output::print_header(&s);
        eprintln!("  Discovering {base_url}...");
        eprintln!();
    }

    let discovery = discover(base_url, agent, config).await?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&discovery)?);
        return Ok(());
    }

    print_discovery(&s, &discovery, agent);
    if !output::is_quiet() {
        eprintln!(
            "  Done in {}",
            output::format_elapsed(start.elapsed())
        );
    }
    Ok(())
}

/// Discover a site using a fresh client built from `config`.
pub async fn discover(
    base_url: &str,
    agent: Option<&str>,
    config: &RuntimeConfig,
) -> Result<Discovery> {
    let (fetcher, resolver) = super::build_resolver(config)?;
    let discoverer = SiteDiscoverer::new(fetcher, resolver);
    Ok(discoverer.discover(base_url, agent).await?)
}

pub(crate) fn print_discovery(s: &Styled, discovery: &Discovery, agent: Option<&str>) {
    for url in &discovery.urls {
        println!("{}", url.loc);
    }

    if output::is_quiet() {
        return;
    }

    eprintln!();
    match &discovery.robots {
        Some(robots) => output::print_field(
            "robots.txt",
            &format!("{} agents, {} sitemaps", robots.agents.len(), robots.sitemaps.len()),
        ),
        None => output::print_field("robots.txt", &s.dim("not found")),
    }
    for sitemap in &discovery.sitemaps {
        output::print_field("sitemap", sitemap);
    }
    output::print_field("urls", &discovery.urls.len().to_string());
    if let Some(agent) = agent {
        let delay = discovery
            .robots
            .as_ref()
            .and_then(|r| r.rules_for(agent))
            .and_then(|rules| rules.crawl_delay);
        output::print_field("disallowed", &discovery.disallowed.to_string());
        if let Some(delay) = delay {
            output::print_field("crawl-delay", &format!("{delay}s"));
        }
    }
    eprintln!();
}
