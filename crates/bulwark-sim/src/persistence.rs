//! Snapshot persistence adapters.

use std::fs;
use std::path::{Path, PathBuf};

use bulwark_core::error::PersistenceError;
use bulwark_core::state::RoundSnapshot;

use crate::services::Persistence;

/// Keeps the last saved snapshot in memory. The engine default.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slot: Option<RoundSnapshot>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn save_snapshot(&mut self, snapshot: &RoundSnapshot) -> Result<(), PersistenceError> {
        self.slot = Some(snapshot.clone());
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<RoundSnapshot>, PersistenceError> {
        Ok(self.slot.clone())
    }
}

/// Writes the snapshot as pretty JSON to `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
    slot: String,
}

impl JsonFilePersistence {
    pub fn new(dir: impl Into<PathBuf>, slot: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            slot: slot.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        snapshot_path(&self.dir, &self.slot)
    }

    /// Remove the slot file if present.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path).map_err(|source| PersistenceError::Io { path, source })?;
        }
        Ok(())
    }
}

fn snapshot_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}.json"))
}

impl Persistence for JsonFilePersistence {
    fn save_snapshot(&mut self, snapshot: &RoundSnapshot) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path();
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).map_err(|source| PersistenceError::Io { path, source })?;
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<RoundSnapshot>, PersistenceError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let json =
            fs::read_to_string(&path).map_err(|source| PersistenceError::Io { path, source })?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(Some(snapshot))
    }
}
