//! Candidate validation
//!
//! Turns parsed candidates into [`AssetRecord`]s. The first candidate that
//! fails aborts the whole batch.

use assetmap_common::AssetRecord;
use serde_json::Value;

use crate::error::{AssetError, AssetResult};

/// Validate a single candidate
///
/// Accepts an object with a non-empty `address` (string, or number coerced
/// to its decimal text), numeric `latitude` and `longitude`, and an optional
/// string `fileId`.
pub fn validate_candidate(position: usize, candidate: &Value) -> AssetResult<AssetRecord> {
    let invalid = |reason: &str| {
        AssetError::InvalidStructure(format!("record {}: {}", position + 1, reason))
    };

    let object = candidate
        .as_object()
        .ok_or_else(|| invalid("expected an object"))?;

    let address = match object.get("address") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(invalid("address must be text")),
        None => return Err(invalid("address is required")),
    };
    if address.trim().is_empty() {
        return Err(invalid("address must not be empty"));
    }

    let latitude = coordinate(object.get("latitude"))
        .ok_or_else(|| invalid("latitude must be a number"))?;
    let longitude = coordinate(object.get("longitude"))
        .ok_or_else(|| invalid("longitude must be a number"))?;

    let file_id = match object.get("fileId") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(invalid("fileId must be text")),
    };

    Ok(AssetRecord {
        address,
        latitude,
        longitude,
        file_id,
    })
}

/// Validate every candidate, stopping at the first failure
pub fn validate_batch(candidates: &[Value]) -> AssetResult<Vec<AssetRecord>> {
    candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| validate_candidate(position, candidate))
        .collect()
}

fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}
