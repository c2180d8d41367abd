//! Company handlers
//!
//! GET /api/companies, PUT/DELETE /api/companies/:company_id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::with_store;
use crate::error::{AssetError, AssetResult};
use crate::store::CompanySummary;
use crate::AppState;

/// PUT /api/companies/:company_id request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameCompanyRequest {
    pub new_company_id: String,
}

/// PUT /api/companies/:company_id response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameCompanyResponse {
    pub old_company_id: String,
    pub new_company_id: String,
}

/// DELETE /api/companies/:company_id response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCompanyResponse {
    pub company_id: String,
    /// Records that were held by the company
    pub removed: usize,
}

/// GET /api/companies
pub async fn list_companies(State(state): State<AppState>) -> AssetResult<Json<Vec<CompanySummary>>> {
    Ok(Json(with_store(&state, |store| store.companies()).await?))
}

/// PUT /api/companies/:company_id
pub async fn rename_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    body: Result<Json<RenameCompanyRequest>, JsonRejection>,
) -> AssetResult<Json<RenameCompanyResponse>> {
    let Json(request) = body.map_err(|e| AssetError::MissingInput(e.body_text()))?;
    let new_company_id = request.new_company_id.trim().to_string();

    let (old_id, new_id) = (company_id.clone(), new_company_id.clone());
    with_store(&state, move |store| store.rename_company(&old_id, &new_id)).await?;
    Ok(Json(RenameCompanyResponse {
        old_company_id: company_id,
        new_company_id,
    }))
}

/// DELETE /api/companies/:company_id
pub async fn delete_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> AssetResult<Json<DeleteCompanyResponse>> {
    let id = company_id.clone();
    let removed = with_store(&state, move |store| store.delete_company(&id)).await?;
    Ok(Json(DeleteCompanyResponse { company_id, removed }))
}

/// Build company routes
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/api/companies", get(list_companies))
        .route(
            "/api/companies/:company_id",
            put(rename_company).delete(delete_company),
        )
}
