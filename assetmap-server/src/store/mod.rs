//! Asset store
//!
//! Owns the company ledger and its persistence backend. Every mutation runs
//! under the write lock as one critical section: the change is applied to a
//! copy of the ledger, the copy is persisted, and only then does it replace
//! the live ledger. A failed write leaves the live ledger untouched, and no
//! reader can observe a half-applied rename or merge.

mod backend;
mod ledger;

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard};

use assetmap_common::{AssetPatch, AssetRecord};
use tracing::info;

use crate::error::{AssetError, AssetResult};

pub use backend::{JsonFileBackend, LedgerBackend, MemoryBackend};
pub use ledger::{CompanySummary, Ledger};

pub struct AssetStore {
    ledger: RwLock<Ledger>,
    backend: Box<dyn LedgerBackend>,
}

impl AssetStore {
    /// Open a store, loading whatever `backend` has persisted
    pub fn open(backend: impl LedgerBackend + 'static) -> AssetResult<Self> {
        let ledger = backend.load()?;
        info!(
            backend = %backend.describe(),
            companies = ledger.len(),
            "Asset store opened"
        );
        Ok(Self {
            ledger: RwLock::new(ledger),
            backend: Box::new(backend),
        })
    }

    /// Store with no persistence
    pub fn in_memory() -> Self {
        Self {
            ledger: RwLock::new(Ledger::new()),
            backend: Box::new(MemoryBackend),
        }
    }

    /// Store mirrored to a JSON file, loaded from it if present
    pub fn with_json_file(path: impl Into<PathBuf>) -> AssetResult<Self> {
        Self::open(JsonFileBackend::new(path))
    }

    pub fn backend_description(&self) -> String {
        self.backend.describe()
    }

    /// Merge `records` into `company_id`'s list
    ///
    /// When `file_tag` is given every incoming record is stamped with it.
    /// Returns the number of records actually appended.
    pub fn set_assets(
        &self,
        company_id: &str,
        records: Vec<AssetRecord>,
        file_tag: Option<&str>,
    ) -> AssetResult<usize> {
        let company_id = require_company_id(company_id)?;
        let records = match file_tag {
            Some(tag) => records
                .into_iter()
                .map(|record| record.with_file_id(tag))
                .collect(),
            None => records,
        };

        let incoming = records.len();
        let added = self.mutate(|ledger| Ok(ledger.merge(company_id, records)))?;
        info!(company_id, incoming, added, "Merged assets");
        Ok(added)
    }

    /// One company's records (empty when unknown), or every record when
    /// `company_id` is `None`
    pub fn get_assets(&self, company_id: Option<&str>) -> AssetResult<Vec<AssetRecord>> {
        let ledger = self.read()?;
        Ok(match company_id {
            Some(id) => ledger.get(id).map(<[AssetRecord]>::to_vec).unwrap_or_default(),
            None => ledger.all_assets(),
        })
    }

    /// Snapshot of the full ledger
    pub fn ledger(&self) -> AssetResult<Ledger> {
        Ok(self.read()?.clone())
    }

    pub fn companies(&self) -> AssetResult<Vec<CompanySummary>> {
        Ok(self.read()?.summaries())
    }

    pub fn rename_company(&self, old_id: &str, new_id: &str) -> AssetResult<()> {
        let new_id = require_company_id(new_id)?;
        self.mutate(|ledger| ledger.rename(old_id, new_id))?;
        info!(old_id, new_id, "Renamed company");
        Ok(())
    }

    pub fn update_record(
        &self,
        company_id: &str,
        index: usize,
        patch: &AssetPatch,
    ) -> AssetResult<AssetRecord> {
        if patch.is_empty() {
            return Err(AssetError::InvalidStructure(
                "patch has no fields to update".to_string(),
            ));
        }
        let updated = self.mutate(|ledger| ledger.update(company_id, index, patch))?;
        info!(company_id, index, "Updated asset");
        Ok(updated)
    }

    pub fn delete_record(&self, company_id: &str, index: usize) -> AssetResult<AssetRecord> {
        let removed = self.mutate(|ledger| ledger.remove_record(company_id, index))?;
        info!(company_id, index, "Deleted asset");
        Ok(removed)
    }

    /// Remove a company; returns how many records it held
    pub fn delete_company(&self, company_id: &str) -> AssetResult<usize> {
        let removed = self.mutate(|ledger| ledger.remove_company(company_id))?;
        info!(company_id, removed = removed.len(), "Deleted company");
        Ok(removed.len())
    }

    pub fn clear(&self) -> AssetResult<()> {
        self.mutate(|ledger| {
            ledger.clear();
            Ok(())
        })?;
        info!("Cleared asset ledger");
        Ok(())
    }

    fn read(&self) -> AssetResult<RwLockReadGuard<'_, Ledger>> {
        self.ledger
            .read()
            .map_err(|_| AssetError::Internal("asset ledger lock poisoned".to_string()))
    }

    /// Apply `op` to a copy, persist it, then commit
    fn mutate<T>(&self, op: impl FnOnce(&mut Ledger) -> AssetResult<T>) -> AssetResult<T> {
        let mut live = self
            .ledger
            .write()
            .map_err(|_| AssetError::Internal("asset ledger lock poisoned".to_string()))?;

        let mut next = live.clone();
        let output = op(&mut next)?;
        self.backend.save(&next)?;
        *live = next;
        Ok(output)
    }
}

/// Trimmed company id, or `MissingInput` when nothing is left
fn require_company_id(company_id: &str) -> AssetResult<&str> {
    let trimmed = company_id.trim();
    if trimmed.is_empty() {
        return Err(AssetError::MissingInput(
            "companyId must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
