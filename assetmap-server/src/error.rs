//! Error types for assetmap-server
//!
//! One taxonomy covers ingestion, store and HTTP failures. Client-caused
//! kinds map to 4xx responses; everything else is an internal fault that is
//! logged here and reported with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Asset service error
#[derive(Debug, Error)]
pub enum AssetError {
    /// Company id or file payload absent (400)
    #[error("{0}")]
    MissingInput(String),

    /// Neither media type nor file name identifies JSON or CSV (400)
    #[error("Unsupported file type. Please upload JSON or CSV (got {0})")]
    UnsupportedType(String),

    /// Unparseable JSON, too few CSV lines, non-UTF-8 payload (400)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// CSV header lacks address/latitude/longitude (400)
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// CSV coordinate that is not a finite number (400)
    #[error("Invalid numeric value '{value}' for {column} on line {line}")]
    InvalidNumeric {
        line: usize,
        column: String,
        value: String,
    },

    /// Candidate record fails validation (400)
    #[error("Invalid asset data structure: {0}")]
    InvalidStructure(String),

    /// Upload body over the configured limit (413)
    #[error("Upload too large: {0}")]
    TooLarge(String),

    /// Unknown company or record index (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rename target exists, or edit would duplicate a record (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal fault (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Ledger file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssetError {
    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            AssetError::MissingInput(_) => "MISSING_INPUT",
            AssetError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            AssetError::MalformedInput(_) => "MALFORMED_INPUT",
            AssetError::MissingColumns(_) => "MISSING_COLUMNS",
            AssetError::InvalidNumeric { .. } => "INVALID_NUMERIC",
            AssetError::InvalidStructure(_) => "INVALID_STRUCTURE",
            AssetError::TooLarge(_) => "PAYLOAD_TOO_LARGE",
            AssetError::NotFound(_) => "NOT_FOUND",
            AssetError::Conflict(_) => "CONFLICT",
            AssetError::Internal(_)
            | AssetError::Io(_)
            | AssetError::Json(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AssetError::MissingInput(_)
            | AssetError::UnsupportedType(_)
            | AssetError::MalformedInput(_)
            | AssetError::MissingColumns(_)
            | AssetError::InvalidNumeric { .. }
            | AssetError::InvalidStructure(_) => StatusCode::BAD_REQUEST,
            AssetError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AssetError::NotFound(_) => StatusCode::NOT_FOUND,
            AssetError::Conflict(_) => StatusCode::CONFLICT,
            AssetError::Internal(_)
            | AssetError::Io(_)
            | AssetError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_internal() {
            error!(error = %self, "Internal failure while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for asset operations and API handlers
pub type AssetResult<T> = Result<T, AssetError>;
