//! Runtime configuration.
//!
//! Settings come from `SITEWALK_*` environment variables; CLI flags override
//! individual fields after loading.

pub mod site;

use crate::acquisition::http_client::HttpClientConfig;
use crate::cartography::fetch_pool::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::cartography::resolver::ResolveOptions;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_FETCH_TIMEOUT_SECS: &str = "SITEWALK_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "SITEWALK_USER_AGENT";
pub const ENV_MAX_FETCHES: &str = "SITEWALK_MAX_FETCHES";
pub const ENV_DETECT_CYCLES: &str = "SITEWALK_DETECT_CYCLES";
pub const ENV_CANCEL_ON_FAILURE: &str = "SITEWALK_CANCEL_ON_FAILURE";
pub const ENV_SITES_DIR: &str = "SITEWALK_SITES_DIR";

/// Default directory holding per-site JSON configs.
pub const DEFAULT_SITES_DIR: &str = "config/sites";

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub http: HttpClientConfig,
    pub resolve: ResolveOptions,
    pub sites_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http: HttpClientConfig::default(),
            resolve: ResolveOptions::default(),
            sites_dir: PathBuf::from(DEFAULT_SITES_DIR),
        }
    }
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_FETCH_TIMEOUT_SECS)? {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(ua) = lookup(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            config.http.user_agent = ua;
        }
        config.resolve.max_concurrent_fetches =
            parse_var::<usize>(&lookup, ENV_MAX_FETCHES)?.unwrap_or(DEFAULT_MAX_CONCURRENT_FETCHES);
        if let Some(flag) = parse_flag(&lookup, ENV_DETECT_CYCLES)? {
            config.resolve.detect_cycles = flag;
        }
        if let Some(flag) = parse_flag(&lookup, ENV_CANCEL_ON_FAILURE)? {
            config.resolve.cancel_on_failure = flag;
        }
        if let Some(dir) = lookup(ENV_SITES_DIR).filter(|v| !v.trim().is_empty()) {
            config.sites_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: '{raw}'"))
        })
        .transpose()
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => anyhow::bail!("invalid value for {key}: '{other}' (expected true/false)"),
    }
}
