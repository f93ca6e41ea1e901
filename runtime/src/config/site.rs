//! Per-site crawl target configuration, stored as `<sites_dir>/<name>.json`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// CSS selectors used to pull product fields out of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSelectors {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Older configs spell this key `avability`.
    #[serde(default, alias = "avability")]
    pub availability: String,
}

/// One crawl target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub selectors: SiteSelectors,
    /// Pages need a JavaScript-capable renderer.
    #[serde(default)]
    pub dynamic_content: bool,
}

impl SiteConfig {
    /// Path of the config file for `name` inside `sites_dir`.
    pub fn path_for(sites_dir: &Path, name: &str) -> PathBuf {
        sites_dir.join(format!("{name}.json"))
    }

    /// Load the config for `name` from `sites_dir`.
    pub fn load(sites_dir: &Path, name: &str) -> Result<Self> {
        let path = Self::path_for(sites_dir, name);
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read site config file {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse site config file {}", path.display()))?;
        config.base()?;
        Ok(config)
    }

    /// The parsed base URL.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .with_context(|| format!("site '{}' has invalid base_url '{}'", self.name, self.base_url))
    }
}
