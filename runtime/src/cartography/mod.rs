//! Cartography: turning a site's sitemaps into the list of pages it publishes.

pub mod discovery;
pub mod fetch_pool;
pub mod resolver;
pub mod robots;
pub mod sitemap;
