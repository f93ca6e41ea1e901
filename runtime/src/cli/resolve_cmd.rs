//! `sitewalk resolve <url>`: flatten a sitemap (and every sitemap it links) into page URLs.

use crate::cartography::sitemap::SitemapUrl;
use crate::cli::output::{self, Styled};
use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Where the root sitemap comes from.
#[derive(Debug, Clone)]
pub enum ResolveSource {
    Url(String),
    /// A local sitemap document; nested sitemaps it references are still fetched.
    File(PathBuf),
}

impl ResolveSource {
    fn label(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Run the resolve command.
pub async fn run(source: ResolveSource, config: &RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();
    let (_, resolver) = super::build_resolver(config)?;

    let result = match &source {
        ResolveSource::Url(url) => resolver.resolve_url(url).await,
        ResolveSource::File(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            resolver.resolve(&xml).await
        }
    };

    let urls = match result {
        Ok(urls) => urls,
        Err(e) => {
            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "source": source.label(),
                    "error": e.to_string(),
                }));
            } else if !output::is_quiet() {
                eprintln!("  {} {}", s.fail_sym(), s.red(&e.to_string()));
            }
            return Err(e).with_context(|| format!("failed to resolve {}", source.label()));
        }
    };

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "source": source.label(),
            "count": urls.len(),
            "urls": urls,
            "duration_ms": start.elapsed().as_millis() as u64,
        }));
        return Ok(());
    }

    print_urls(&s, &source, &urls, start.elapsed());
    Ok(())
}

/// URLs go to stdout so the output can be piped; the summary goes to stderr.
fn print_urls(s: &Styled, source: &ResolveSource, urls: &[SitemapUrl], elapsed: Duration) {
    for url in urls {
        if output::is_verbose() {
            println!("{}", verbose_line(url));
        } else {
            println!("{}", url.loc);
        }
    }

    if !output::is_quiet() {
        eprintln!();
        eprintln!(
            "  {} {} URLs from {} in {}",
            s.ok_sym(),
            urls.len(),
            source.label(),
            output::format_elapsed(elapsed)
        );
    }
}

fn verbose_line(url: &SitemapUrl) -> String {
    let mut line = url.loc.clone();
    for (key, value) in [
        ("lastmod", &url.lastmod),
        ("changefreq", &url.changefreq),
        ("priority", &url.priority),
    ] {
        if let Some(v) = value {
            line.push_str(&format!("\t{key}={v}"));
        }
    }
    line
}
