//! Upload ingestion
//!
//! Detects the payload kind, runs the matching parser, validates every
//! candidate and forwards the batch to the store. Nothing is committed
//! unless the whole batch validates.

pub mod csv;
pub mod json;
pub mod validate;

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::error::{AssetError, AssetResult};
use crate::store::AssetStore;

pub use validate::{validate_batch, validate_candidate};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Json,
    Csv,
}

impl FileKind {
    /// Match a declared media type, ignoring parameters and case
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("application/json") {
            Some(FileKind::Json)
        } else if essence.eq_ignore_ascii_case("text/csv") {
            Some(FileKind::Csv)
        } else {
            None
        }
    }

    /// Match a `.json` / `.csv` suffix, ignoring case
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.trim().to_ascii_lowercase();
        if lower.ends_with(".json") {
            Some(FileKind::Json)
        } else if lower.ends_with(".csv") {
            Some(FileKind::Csv)
        } else {
            None
        }
    }

    /// Media type first, file name second
    pub fn detect(media_type: Option<&str>, file_name: &str) -> AssetResult<Self> {
        media_type
            .and_then(Self::from_media_type)
            .or_else(|| Self::from_file_name(file_name))
            .ok_or_else(|| {
                let described = match media_type {
                    Some(media_type) if !media_type.trim().is_empty() => {
                        format!("{} '{}'", media_type, file_name)
                    }
                    _ => format!("'{}'", file_name),
                };
                AssetError::UnsupportedType(described)
            })
    }

    pub fn parse(self, text: &str) -> AssetResult<ParsedBatch> {
        match self {
            FileKind::Json => Ok(ParsedBatch {
                candidates: json::parse_json(text)?,
                skipped_rows: 0,
            }),
            FileKind::Csv => csv::parse_csv(text),
        }
    }
}

/// Parser output before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub candidates: Vec<Value>,
    /// CSV rows dropped for a field-count mismatch
    pub skipped_rows: usize,
}

/// Uploaded file part
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub media_type: Option<String>,
    pub content: Vec<u8>,
}

/// Inputs gathered from an upload request
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub company_id: Option<String>,
    pub file: Option<UploadFile>,
    /// Tag to stamp on every record; generated when absent
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub accepted: bool,
    /// Validated records in the upload
    pub count: usize,
    /// Records appended after de-duplication
    pub added: usize,
    /// CSV rows skipped for a field-count mismatch
    pub skipped: usize,
    pub file_id: String,
}

/// Parse, validate and store one upload
pub fn ingest_upload(store: &AssetStore, request: UploadRequest) -> AssetResult<UploadOutcome> {
    let company_id = request
        .company_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let (company_id, file) = match (company_id, request.file) {
        (Some(company_id), Some(file)) => (company_id.to_string(), file),
        _ => {
            return Err(AssetError::MissingInput(
                "companyId and assetFile are required".to_string(),
            ))
        }
    };

    let kind = FileKind::detect(file.media_type.as_deref(), &file.file_name)?;
    let text = String::from_utf8(file.content).map_err(|e| {
        AssetError::MalformedInput(format!("file is not valid UTF-8: {}", e))
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let batch = kind.parse(text)?;
    let records = validate_batch(&batch.candidates)?;
    let count = records.len();

    let file_id = request
        .file_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let added = store.set_assets(&company_id, records, Some(file_id.as_str()))?;

    info!(
        company_id = %company_id,
        file = %file.file_name,
        kind = ?kind,
        count,
        added,
        skipped = batch.skipped_rows,
        "Ingested upload"
    );

    Ok(UploadOutcome {
        accepted: true,
        count,
        added,
        skipped: batch.skipped_rows,
        file_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(company_id: &str, file_name: &str, media_type: Option<&str>, body: &str) -> UploadRequest {
        UploadRequest {
            company_id: Some(company_id.to_string()),
            file: Some(UploadFile {
                file_name: file_name.to_string(),
                media_type: media_type.map(str::to_string),
                content: body.as_bytes().to_vec(),
            }),
            file_id: None,
        }
    }

    #[test]
    fn test_media_type_detection() {
        assert_eq!(
            FileKind::from_media_type("application/json; charset=utf-8"),
            Some(FileKind::Json)
        );
        assert_eq!(FileKind::from_media_type("TEXT/CSV"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_media_type("application/octet-stream"), None);
    }

    #[test]
    fn test_file_name_fallback() {
        assert_eq!(
            FileKind::detect(Some("application/octet-stream"), "assets.CSV").unwrap(),
            FileKind::Csv
        );
        assert_eq!(FileKind::detect(None, "data.json").unwrap(), FileKind::Json);
        assert!(matches!(
            FileKind::detect(Some("text/plain"), "notes.txt"),
            Err(AssetError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_missing_inputs_checked_first() {
        let store = AssetStore::in_memory();

        let mut request = upload("", "bad.txt", None, "garbage");
        let err = ingest_upload(&store, request.clone()).unwrap_err();
        assert_eq!(err.to_string(), "companyId and assetFile are required");

        request.company_id = Some("c".into());
        request.file = None;
        assert!(matches!(
            ingest_upload(&store, request),
            Err(AssetError::MissingInput(_))
        ));
        assert!(store.companies().unwrap().is_empty());
    }

    #[test]
    fn test_json_upload_reports_counts() {
        let store = AssetStore::in_memory();
        let body = r#"[{"address":"123 St","latitude":51.5,"longitude":-0.1},
                       {"address":"123 St","latitude":51.5,"longitude":-0.1},
                       {"address":"456 Ave","latitude":40.7,"longitude":-74.0}]"#;

        let outcome =
            ingest_upload(&store, upload("companyA", "a.json", Some("application/json"), body))
                .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.count, 3);
        assert_eq!(outcome.added, 2);

        let stored = store.get_assets(Some("companyA")).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored
            .iter()
            .all(|r| r.file_id.as_deref() == Some(outcome.file_id.as_str())));
    }

    #[test]
    fn test_csv_upload_with_bom() {
        let store = AssetStore::in_memory();
        let body = "\u{feff}address,latitude,longitude\r\n123 St,51.5,-0.1\r\n";

        let outcome = ingest_upload(&store, upload("c", "a.csv", None, body)).unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(store.get_assets(Some("c")).unwrap()[0].address, "123 St");
    }

    #[test]
    fn test_skipped_csv_rows_are_reported() {
        let store = AssetStore::in_memory();
        let body = "address,latitude,longitude\n\"Suite 4, 5 Main St\",3.0,4.0\n";

        let outcome = ingest_upload(&store, upload("c", "a.csv", None, body)).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.count, 0);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.skipped, 1);

        let outcome = ingest_upload(
            &store,
            upload("c", "a.json", None, r#"[{"address":"x","latitude":1,"longitude":2}]"#),
        )
        .unwrap();
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_invalid_record_commits_nothing() {
        let store = AssetStore::in_memory();
        let body = r#"[{"address":"ok","latitude":1,"longitude":2},
                       {"address":"x","latitude":"not-a-number","longitude":0}]"#;

        let err = ingest_upload(&store, upload("c", "a.json", None, body)).unwrap_err();
        assert!(matches!(err, AssetError::InvalidStructure(_)));
        assert!(store.get_assets(None).unwrap().is_empty());
    }

    #[test]
    fn test_supplied_file_id_is_used() {
        let store = AssetStore::in_memory();
        let mut request = upload("c", "a.json", None, r#"{"address":"x","latitude":1,"longitude":2}"#);
        request.file_id = Some("batch-7".into());

        let outcome = ingest_upload(&store, request).unwrap();
        assert_eq!(outcome.file_id, "batch-7");
    }

    #[test]
    fn test_non_utf8_is_malformed() {
        let store = AssetStore::in_memory();
        let mut request = upload("c", "a.csv", None, "");
        if let Some(file) = request.file.as_mut() {
            file.content = vec![0xff, 0xfe, 0x00];
        }

        assert!(matches!(
            ingest_upload(&store, request),
            Err(AssetError::MalformedInput(_))
        ));
    }
}
