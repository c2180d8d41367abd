//! Asset record model
//!
//! An asset is an address with a coordinate pair, optionally tagged with the
//! id of the upload that produced it. Records are never mutated in place:
//! edits produce a new record via [`AssetRecord::patched`].

use serde::{Deserialize, Serialize};

/// A validated address + coordinate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Upload that introduced this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl AssetRecord {
    pub fn new(address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.into(),
            latitude,
            longitude,
            file_id: None,
        }
    }

    /// Copy of this record stamped with `file_id`
    pub fn with_file_id(self, file_id: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id.into()),
            ..self
        }
    }

    /// De-duplication equality: exact match on address, latitude and longitude.
    ///
    /// `file_id` is not compared; the same location uploaded from two files
    /// is one asset.
    pub fn same_location(&self, other: &AssetRecord) -> bool {
        self.address == other.address
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }

    /// New record with the fields present in `patch` replaced
    pub fn patched(&self, patch: &AssetPatch) -> AssetRecord {
        AssetRecord {
            address: patch.address.clone().unwrap_or_else(|| self.address.clone()),
            latitude: patch.latitude.unwrap_or(self.latitude),
            longitude: patch.longitude.unwrap_or(self.longitude),
            file_id: self.file_id.clone(),
        }
    }
}

/// Partial update for a single record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.latitude.is_none() && self.longitude.is_none()
    }
}
