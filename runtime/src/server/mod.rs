//! HTTP API exposing sitemap resolution.

pub mod routes;

use crate::cartography::resolver::SitemapResolver;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: SitemapResolver,
}

/// Serve the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await
        .context("server error")
}
