//! `sitewalk serve`: expose sitemap resolution over HTTP.

use crate::cli::output::{self, Styled};
use crate::config::RuntimeConfig;
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

/// Run the HTTP server until Ctrl-C.
pub async fn run(addr: &str, config: &RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address '{addr}'"))?;
    let (_, resolver) = super::build_resolver(config)?;

    if !output::is_quiet() {
        output::print_header(&s);
        eprintln!("  {} Listening on http://{addr}", s.ok_sym());
        eprintln!();
    }

    info!(
        %addr,
        max_fetches = config.resolve.max_concurrent_fetches,
        "starting sitewalk v{}",
        env!("CARGO_PKG_VERSION")
    );
    server::serve(addr, AppState { resolver }).await
}
