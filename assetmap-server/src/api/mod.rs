//! HTTP API handlers for assetmap-server

pub mod assets;
pub mod buildinfo;
pub mod companies;
pub mod health;
pub mod ui;
pub mod upload;

pub use assets::asset_routes;
pub use buildinfo::get_build_info;
pub use companies::company_routes;
pub use health::health_routes;
pub use ui::{serve_app_js, serve_index};
pub use upload::upload_routes;

use std::sync::Arc;

use crate::error::{AssetError, AssetResult};
use crate::store::AssetStore;
use crate::AppState;

/// Run a store operation on the blocking pool
///
/// Store writes hold the ledger lock across file I/O, so handlers never
/// call the store directly from an async task.
pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> AssetResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AssetStore) -> AssetResult<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| AssetError::Internal(format!("Store task join error: {}", e)))?
}
