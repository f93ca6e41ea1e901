//! `sitewalk robots <url|path>`: show the rules a robots.txt declares.

use crate::cartography::robots::{parse_robots, Robots};
use crate::cli::output::{self, Styled};
use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the robots command.
pub async fn run(source: &str, agent: Option<&str>, config: &RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let txt = load(source, config).await?;
    let robots = parse_robots(&txt).with_context(|| format!("failed to parse {source}"))?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&robots)?);
        return Ok(());
    }

    print_robots(&s, &robots, agent);
    Ok(())
}

async fn load(source: &str, config: &RuntimeConfig) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let (fetcher, _) = super::build_resolver(config)?;
        return Ok(fetcher.fetch(source).await?);
    }
    let path = Path::new(source);
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_robots(s: &Styled, robots: &Robots, agent: Option<&str>) {
    let mut agents: Vec<_> = match agent {
        Some(agent) => robots.rules_for(agent).into_iter().collect(),
        None => robots.agents.values().collect(),
    };
    agents.sort_by(|a, b| a.user_agent.cmp(&b.user_agent));

    if agents.is_empty() && !output::is_quiet() {
        eprintln!("  {} no rules apply; everything is allowed", s.warn_sym());
    }

    for rules in agents {
        println!("{}", s.bold(&format!("User-agent: {}", rules.user_agent)));
        for path in &rules.allow {
            println!("  {} {path}", s.green("allow   "));
        }
        for path in &rules.disallow {
            println!("  {} {path}", s.red("disallow"));
        }
        if let Some(delay) = rules.crawl_delay {
            println!("  {} {delay}s", s.dim("delay   "));
        }
    }

    for sitemap in &robots.sitemaps {
        println!("Sitemap: {sitemap}");
    }
}
