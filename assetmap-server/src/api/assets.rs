//! Asset query, edit and delete handlers
//!
//! GET /api/assets, GET /api/ledger, PATCH/DELETE /api/assets/:company_id/:index,
//! DELETE /api/assets

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use assetmap_common::{AssetPatch, AssetRecord};

use super::with_store;
use crate::error::{AssetError, AssetResult};
use crate::store::Ledger;
use crate::AppState;

/// GET /api/assets query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    pub company_id: Option<String>,
}

impl AssetQuery {
    /// Blank filter means "all companies"
    fn company_filter(&self) -> Option<&str> {
        self.company_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// GET /api/assets
///
/// One company's records, or every record in ledger order when no
/// `companyId` is given.
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> AssetResult<Json<Vec<AssetRecord>>> {
    let company_id = query.company_filter().map(str::to_string);
    let assets = with_store(&state, move |store| store.get_assets(company_id.as_deref())).await?;
    Ok(Json(assets))
}

/// GET /api/ledger
pub async fn get_ledger(State(state): State<AppState>) -> AssetResult<Json<Ledger>> {
    Ok(Json(with_store(&state, |store| store.ledger()).await?))
}

/// PATCH /api/assets/:company_id/:index
pub async fn update_asset(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
    body: Result<Json<AssetPatch>, JsonRejection>,
) -> AssetResult<Json<AssetRecord>> {
    let (company_id, index) = record_path(path)?;
    let Json(patch) = body.map_err(|e| AssetError::InvalidStructure(e.body_text()))?;

    let updated =
        with_store(&state, move |store| store.update_record(&company_id, index, &patch)).await?;
    Ok(Json(updated))
}

/// DELETE /api/assets/:company_id/:index
pub async fn delete_asset(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> AssetResult<Json<AssetRecord>> {
    let (company_id, index) = record_path(path)?;
    let removed =
        with_store(&state, move |store| store.delete_record(&company_id, index)).await?;
    Ok(Json(removed))
}

/// DELETE /api/assets
///
/// Empties the whole ledger.
pub async fn clear_assets(State(state): State<AppState>) -> AssetResult<StatusCode> {
    with_store(&state, |store| store.clear()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A non-numeric index cannot address a record
fn record_path(path: Result<Path<(String, usize)>, PathRejection>) -> AssetResult<(String, usize)> {
    path.map(|Path(parts)| parts)
        .map_err(|e| AssetError::NotFound(format!("No such asset: {}", e.body_text())))
}

/// Build asset routes
pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/api/assets", get(list_assets).delete(clear_assets))
        .route(
            "/api/assets/:company_id/:index",
            patch(update_asset).delete(delete_asset),
        )
        .route("/api/ledger", get(get_ledger))
}
