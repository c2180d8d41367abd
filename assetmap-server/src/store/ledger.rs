//! Company ledger
//!
//! Ordered mapping from company id to that company's asset list. Companies
//! keep first-insertion order (a rename keeps the slot), records keep upload
//! order. No two records under one company share an
//! (address, latitude, longitude) triple.
//!
//! Serialized as a single JSON object `{ companyId: AssetRecord[] }` with
//! keys in ledger order.

use std::fmt;

use assetmap_common::{AssetPatch, AssetRecord};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AssetError, AssetResult};

/// One company's slot in the ledger
#[derive(Debug, Clone, PartialEq)]
struct CompanyEntry {
    company_id: String,
    assets: Vec<AssetRecord>,
}

/// Company id with its record count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub company_id: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<CompanyEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of companies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, company_id: &str) -> bool {
        self.position(company_id).is_some()
    }

    /// Records for one company, `None` if the company is unknown
    pub fn get(&self, company_id: &str) -> Option<&[AssetRecord]> {
        self.position(company_id)
            .map(|index| self.entries[index].assets.as_slice())
    }

    /// All records, company by company in ledger order
    pub fn all_assets(&self) -> Vec<AssetRecord> {
        self.entries
            .iter()
            .flat_map(|entry| entry.assets.iter().cloned())
            .collect()
    }

    /// Iterate `(company_id, records)` in ledger order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AssetRecord])> {
        self.entries
            .iter()
            .map(|entry| (entry.company_id.as_str(), entry.assets.as_slice()))
    }

    pub fn summaries(&self) -> Vec<CompanySummary> {
        self.entries
            .iter()
            .map(|entry| CompanySummary {
                company_id: entry.company_id.clone(),
                count: entry.assets.len(),
            })
            .collect()
    }

    /// Append records not already present under `company_id`
    ///
    /// Creates the company on first use, even for an empty batch. Returns the
    /// number of records appended.
    pub fn merge(&mut self, company_id: &str, incoming: Vec<AssetRecord>) -> usize {
        let index = match self.position(company_id) {
            Some(index) => index,
            None => {
                self.entries.push(CompanyEntry {
                    company_id: company_id.to_string(),
                    assets: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let assets = &mut self.entries[index].assets;
        let before = assets.len();
        for record in incoming {
            if !assets.iter().any(|existing| existing.same_location(&record)) {
                assets.push(record);
            }
        }
        assets.len() - before
    }

    /// Move a company's records to a new id, keeping its position
    pub fn rename(&mut self, old_id: &str, new_id: &str) -> AssetResult<()> {
        let index = self
            .position(old_id)
            .ok_or_else(|| company_not_found(old_id))?;
        if self.contains(new_id) {
            return Err(AssetError::Conflict(format!(
                "Company already exists: {}",
                new_id
            )));
        }
        self.entries[index].company_id = new_id.to_string();
        Ok(())
    }

    /// Replace the provided fields of one record
    ///
    /// Fails with `Conflict` when the edited record would duplicate another
    /// record of the same company.
    pub fn update(
        &mut self,
        company_id: &str,
        index: usize,
        patch: &AssetPatch,
    ) -> AssetResult<AssetRecord> {
        let assets = self.assets_mut(company_id, index)?;
        let updated = assets[index].patched(patch);

        if updated.address.trim().is_empty() {
            return Err(AssetError::InvalidStructure(
                "address must not be empty".to_string(),
            ));
        }
        if !updated.latitude.is_finite() || !updated.longitude.is_finite() {
            return Err(AssetError::InvalidStructure(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        let duplicate = assets
            .iter()
            .enumerate()
            .any(|(other, record)| other != index && record.same_location(&updated));
        if duplicate {
            return Err(AssetError::Conflict(format!(
                "Company {} already has an asset at {} ({}, {})",
                company_id, updated.address, updated.latitude, updated.longitude
            )));
        }

        assets[index] = updated.clone();
        Ok(updated)
    }

    /// Remove one record; later records shift down by one
    pub fn remove_record(&mut self, company_id: &str, index: usize) -> AssetResult<AssetRecord> {
        let assets = self.assets_mut(company_id, index)?;
        Ok(assets.remove(index))
    }

    /// Remove a company and return its records
    pub fn remove_company(&mut self, company_id: &str) -> AssetResult<Vec<AssetRecord>> {
        let index = self
            .position(company_id)
            .ok_or_else(|| company_not_found(company_id))?;
        Ok(self.entries.remove(index).assets)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, company_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.company_id == company_id)
    }

    /// Records of `company_id`, provided `index` addresses one of them
    fn assets_mut(&mut self, company_id: &str, index: usize) -> AssetResult<&mut Vec<AssetRecord>> {
        let position = self
            .position(company_id)
            .ok_or_else(|| company_not_found(company_id))?;
        let assets = &mut self.entries[position].assets;
        if index >= assets.len() {
            return Err(AssetError::NotFound(format!(
                "Company {} has no asset at index {}",
                company_id, index
            )));
        }
        Ok(assets)
    }
}

fn company_not_found(company_id: &str) -> AssetError {
    AssetError::NotFound(format!("Company not found: {}", company_id))
}

impl Serialize for Ledger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.company_id, &entry.assets)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LedgerVisitor)
    }
}

struct LedgerVisitor;

impl<'de> Visitor<'de> for LedgerVisitor {
    type Value = Ledger;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping company ids to asset arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Ledger, A::Error> {
        let mut ledger = Ledger::new();
        // Going through merge keeps the no-duplicates invariant for hand-edited files
        while let Some((company_id, assets)) = access.next_entry::<String, Vec<AssetRecord>>()? {
            ledger.merge(&company_id, assets);
        }
        Ok(ledger)
    }
}
