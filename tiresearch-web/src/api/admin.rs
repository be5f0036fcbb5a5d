//! Admin endpoints (loopback clients only)
//!
//! Requests from anywhere else get the static not-found page, so the admin
//! surface is indistinguishable from a missing route.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use tiresearch_common::catalog::Catalog;
use tiresearch_loader::{rebuild_catalog, PipelineReport};
use tracing::{info, warn};

use crate::db::{tire_stats, TireStats};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Static page non-local admin requests are sent to
pub const NOT_FOUND_PAGE: &str = "/404.html";

/// Middleware: pass loopback clients, answer everyone else with a 404
///
/// A request without connection info (no peer address) is not local.
pub async fn require_localhost(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    match connect_info {
        Some(ConnectInfo(addr)) if addr.ip().is_loopback() => next.run(request).await,
        other => {
            warn!(
                peer = ?other.map(|ConnectInfo(addr)| addr),
                path = %request.uri().path(),
                "Rejected non-local admin request"
            );
            (
                StatusCode::NOT_FOUND,
                [(header::LOCATION, NOT_FOUND_PAGE)],
            )
                .into_response()
        }
    }
}

/// GET /admin/tire_stats
pub async fn get_tire_stats(State(state): State<AppState>) -> ApiResult<Json<TireStats>> {
    Ok(Json(tire_stats(&state.db).await?))
}

/// POST /admin/reload
///
/// Re-runs the rebuild pipeline against the configured catalog. Concurrent
/// reloads queue behind one another.
pub async fn reload_catalog(State(state): State<AppState>) -> ApiResult<Json<PipelineReport>> {
    let catalog_path = state
        .catalog_path
        .clone()
        .ok_or_else(|| ApiError::Unavailable("No catalog configured".to_string()))?;

    let _guard = state.reload_lock.lock().await;
    info!("Reloading catalog from {}", catalog_path.display());

    let path = catalog_path.clone();
    let catalog = tokio::task::spawn_blocking(move || Catalog::from_file(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("Catalog reader task failed: {}", e)))??;

    let report = rebuild_catalog(&state.db, &catalog, Some(&catalog_path)).await?;
    Ok(Json(report))
}
