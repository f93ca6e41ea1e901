//! Sitewalk runtime: recursive sitemap resolution and the tooling around it.
//!
//! - [`acquisition`]: HTTP fetching with timeouts and gzip decoding.
//! - [`cartography`]: sitemap classification, recursive resolution, robots.txt, discovery.
//! - [`extraction`]: selector-driven product extraction for configured sites.
//! - [`trust`]: HTML sanitization for scraped content.
//! - [`config`]: environment and per-site configuration.
//! - [`server`]: HTTP API.
//! - [`cli`]: `sitewalk` subcommands.

pub mod acquisition;
pub mod cartography;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod server;
pub mod trust;
