//! Route table and handlers.

use super::AppState;
use crate::cartography::resolver::ResolveError;
use crate::cartography::sitemap::SitemapUrl;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the router: `/api/ping`, `/api/v1/ping`, `/api/v1/sitemaps/resolve`.
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/ping", get(ping_v1))
        .route("/sitemaps/resolve", post(resolve_sitemap))
        .with_state(state);

    Router::new()
        .route("/api/ping", get(ping))
        .nest("/api/v1", api_v1)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong" }))
}

async fn ping_v1() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong", "version": "v1" }))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub count: usize,
    pub urls: Vec<SitemapUrl>,
}

async fn resolve_sitemap(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let urls = state.resolver.resolve_url(&req.url).await.map_err(|e| {
        warn!(url = %req.url, error = %e, "sitemap resolution failed");
        ApiError(e)
    })?;

    Ok(Json(ResolveResponse {
        count: urls.len(),
        urls,
    }))
}

/// Resolution failure rendered as a JSON error body.
pub struct ApiError(pub ResolveError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ResolveError::UnknownFormat => (StatusCode::UNPROCESSABLE_ENTITY, "unknown_format"),
            ResolveError::Cycle { .. } => (StatusCode::BAD_GATEWAY, "cycle"),
            ResolveError::Fetch(_) => (StatusCode::BAD_GATEWAY, "fetch_failed"),
            ResolveError::Cancelled => (StatusCode::BAD_GATEWAY, "cancelled"),
            ResolveError::PoolClosed | ResolveError::Task(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        (
            status,
            Json(json!({ "error": code, "message": self.0.to_string() })),
        )
            .into_response()
    }
}
