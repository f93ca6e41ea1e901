//! Parse robots.txt files into per-agent crawl rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("failed to parse crawl delay '{value}' on line {line}: {source}")]
    InvalidCrawlDelay {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },
}

/// Rules declared for one user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRules {
    #[serde(rename = "user-agent")]
    pub user_agent: String,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    #[serde(rename = "crawl-delay")]
    pub crawl_delay: Option<u32>,
}

impl AgentRules {
    fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ..Self::default()
        }
    }

    /// Check if a path is allowed by these rules.
    pub fn is_allowed(&self, path: &str) -> bool {
        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| path_matches(path, p))
                .map(|p| p.len())
                .max()
        };

        // Longer match wins; ties go to allow
        match (longest(&self.allow), longest(&self.disallow)) {
            (Some(allow), Some(disallow)) => allow >= disallow,
            (_, Some(_)) => false,
            _ => true,
        }
    }
}

/// A parsed robots.txt file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robots {
    #[serde(rename = "user-agent-rules")]
    pub agents: HashMap<String, AgentRules>,
    /// `Sitemap:` declarations, in file order.
    pub sitemaps: Vec<String>,
}

impl Robots {
    /// Rules for `user_agent`: exact name, then case-insensitive, then `*`.
    pub fn rules_for(&self, user_agent: &str) -> Option<&AgentRules> {
        self.agents
            .get(user_agent)
            .or_else(|| {
                self.agents
                    .values()
                    .find(|r| r.user_agent.eq_ignore_ascii_case(user_agent))
            })
            .or_else(|| self.agents.get("*"))
    }

    /// Whether `user_agent` may fetch `path`. Agents without rules may fetch anything.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        self.rules_for(user_agent)
            .map(|rules| rules.is_allowed(path))
            .unwrap_or(true)
    }
}

/// Parse a robots.txt string.
///
/// Consecutive `User-agent` lines form one group; a blank line or comment
/// ends the group. Directives outside a group are ignored.
pub fn parse_robots(txt: &str) -> Result<Robots, RobotsError> {
    let mut robots = Robots::default();
    let mut group: Vec<String> = Vec::new();

    for (idx, line) in txt.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            group.clear();
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                robots
                    .agents
                    .entry(value.to_string())
                    .or_insert_with(|| AgentRules::new(value));
                group.push(value.to_string());
            }
            "sitemap" => {
                // Sitemap directives are global
                if !value.is_empty() {
                    robots.sitemaps.push(value.to_string());
                }
            }
            "allow" => {
                for rules in group_rules(&mut robots, &group) {
                    rules.allow.push(value.to_string());
                }
            }
            "disallow" => {
                for rules in group_rules(&mut robots, &group) {
                    rules.disallow.push(value.to_string());
                }
            }
            "crawl-delay" => {
                if group.is_empty() {
                    continue;
                }
                let delay = value
                    .parse::<u32>()
                    .map_err(|source| RobotsError::InvalidCrawlDelay {
                        value: value.to_string(),
                        line: idx + 1,
                        source,
                    })?;
                for rules in group_rules(&mut robots, &group) {
                    rules.crawl_delay = Some(delay);
                }
            }
            _ => {}
        }
    }

    Ok(robots)
}

fn group_rules<'a>(
    robots: &'a mut Robots,
    group: &'a [String],
) -> impl Iterator<Item = &'a mut AgentRules> {
    robots
        .agents
        .iter_mut()
        .filter(move |(agent, _)| group.contains(agent))
        .map(|(_, rules)| rules)
}

/// Check if a path matches a robots.txt pattern.
fn path_matches(path: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return path.starts_with(prefix);
    }

    if let Some(exact) = pattern.strip_suffix('$') {
        return path == exact;
    }

    path.starts_with(pattern)
}
