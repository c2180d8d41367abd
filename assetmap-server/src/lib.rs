//! assetmap-server library
//!
//! Company-scoped asset records (address + coordinates) with JSON/CSV upload,
//! exposed over HTTP. Exposes the router and state for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod store;

pub use crate::error::{AssetError, AssetResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::AssetStore;

/// Default cap on upload request bodies (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Asset ledger and its persistence
    pub store: Arc<AssetStore>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: AssetStore) -> Self {
        Self {
            store: Arc::new(store),
            startup_time: Utc::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .merge(api::asset_routes())
        .merge(api::company_routes())
        .merge(api::upload_routes(state.max_upload_bytes))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
