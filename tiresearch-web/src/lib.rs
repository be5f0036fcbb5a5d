//! tiresearch-web library - tire search HTTP API

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Catalog `POST /admin/reload` rebuilds from, if configured
    pub catalog_path: Option<PathBuf>,
    /// Held for the duration of a reload
    pub reload_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, catalog_path: Option<PathBuf>) -> Self {
        Self {
            db,
            catalog_path,
            reload_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Loopback-only routes
    let admin = Router::new()
        .route("/admin/tire_stats", get(api::get_tire_stats))
        .route("/admin/reload", post(api::reload_catalog))
        .layer(middleware::from_fn(api::require_localhost));

    let search = Router::new()
        .route("/", get(api::default_search))
        .route("/standard_search", get(api::standard_search))
        .route("/wheel_search", get(api::wheel_search))
        .route("/staggered_search", get(api::staggered_search))
        .route("/hardcore_search", get(api::hardcore_search))
        .route("/search_options", get(api::search_options))
        .merge(api::health_routes());

    Router::new().merge(admin).merge(search).with_state(state)
}
