//! Ledger persistence backends
//!
//! The whole ledger is loaded once at startup and written wholesale after
//! every mutation. No incremental writes.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use super::ledger::Ledger;
use crate::error::AssetResult;

/// Storage medium behind an [`AssetStore`](super::AssetStore)
pub trait LedgerBackend: Send + Sync {
    /// Read the persisted ledger; an absent ledger is an empty one
    fn load(&self) -> AssetResult<Ledger>;

    /// Replace the persisted ledger with `ledger`
    fn save(&self, ledger: &Ledger) -> AssetResult<()>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Process memory only; nothing survives a restart
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

impl LedgerBackend for MemoryBackend {
    fn load(&self) -> AssetResult<Ledger> {
        Ok(Ledger::new())
    }

    fn save(&self, _ledger: &Ledger) -> AssetResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Single JSON file holding `{ companyId: AssetRecord[] }`
///
/// Writes go to a `.tmp` sibling which is then renamed over the target, so
/// readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerBackend for JsonFileBackend {
    fn load(&self) -> AssetResult<Ledger> {
        if !self.path.exists() {
            info!("No ledger file at {}, starting empty", self.path.display());
            return Ok(Ledger::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Ledger::new());
        }
        let ledger: Ledger = serde_json::from_str(&content)?;
        info!(
            companies = ledger.len(),
            "Loaded ledger from {}",
            self.path.display()
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> AssetResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(ledger)?;
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(
            companies = ledger.len(),
            bytes = bytes.len(),
            "Wrote ledger to {}",
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}
