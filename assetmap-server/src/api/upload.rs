//! Asset upload handler
//!
//! POST /api/assets/upload (multipart: `companyId`, `assetFile`)

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use super::with_store;
use crate::error::{AssetError, AssetResult};
use crate::ingest::{ingest_upload, UploadFile, UploadOutcome, UploadRequest};
use crate::AppState;

/// POST /api/assets/upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub company_id: String,
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

/// POST /api/assets/upload
pub async fn upload_assets(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AssetResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| {
        warn!("Upload rejected: {}", e.body_text());
        AssetError::MissingInput("companyId and assetFile are required".to_string())
    })?;

    let request = read_upload_form(multipart).await?;
    let company_id = request.company_id.clone().unwrap_or_default();
    let file_name = request
        .file
        .as_ref()
        .map(|file| file.file_name.clone())
        .unwrap_or_default();

    match with_store(&state, move |store| ingest_upload(store, request)).await {
        Ok(outcome) => Ok(Json(UploadResponse {
            message: "Assets uploaded successfully".to_string(),
            company_id: company_id.trim().to_string(),
            file_name,
            outcome,
        })),
        Err(e) => {
            if !e.is_internal() {
                warn!(company_id = %company_id, file = %file_name, "Upload rejected: {}", e);
            }
            Err(e)
        }
    }
}

/// Collect `companyId` and `assetFile`; other fields are ignored
async fn read_upload_form(mut multipart: Multipart) -> AssetResult<UploadRequest> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("companyId") => {
                request.company_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("assetFile") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let media_type = field.content_type().map(str::to_string);
                let content = field.bytes().await.map_err(multipart_error)?;
                request.file = Some(UploadFile {
                    file_name,
                    media_type,
                    content: content.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(e: MultipartError) -> AssetError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AssetError::TooLarge(e.body_text())
    } else {
        AssetError::MalformedInput(e.body_text())
    }
}

/// Build upload routes with the given body limit
pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/assets/upload", post(upload_assets))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
