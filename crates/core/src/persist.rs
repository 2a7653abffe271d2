//! Durable bin-state persistence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Bins;

/// File stem of the single save slot, matching the original storage key.
pub const SAVE_KEY: &str = "value-sort";

/// Serialized snapshot of the three bins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    /// Bin contents keyed by bin name.
    pub bins: Bins,
    /// Timestamp of the last write; absent in blobs written by older versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedState {
    /// Snapshot the given bins with a fresh timestamp.
    pub fn new(bins: Bins) -> Self {
        Self {
            bins,
            saved_at: Some(Utc::now()),
        }
    }
}

/// Reads and writes the single `value-sort.json` save file.
///
/// The backing directory is probed for writability once at construction;
/// when the probe fails every later load answers `None` and every save is
/// a no-op, so a session without durable storage still functions.
pub struct StateFile {
    path: PathBuf,
    available: bool,
}

impl StateFile {
    /// Create a store rooted at the given directory, probing it for
    /// writability.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let available = probe(&root);
        if !available {
            warn!(
                "Save directory {} is not writable; persistence disabled for this session",
                root.display()
            );
        }
        Self {
            path: root.join(format!("{SAVE_KEY}.json")),
            available,
        }
    }

    /// Whether the backing directory accepted the startup write probe.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Path of the save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot.
    ///
    /// A missing file, unparseable JSON, or an unexpected shape all come
    /// back as `None`: a corrupted save must never block startup.
    pub fn load(&self) -> Option<PersistedState> {
        if !self.available {
            return None;
        }
        match self.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Discarding saved state: {err:#}");
                None
            }
        }
    }

    /// Write the bins to the save file. Skipped when persistence is
    /// unavailable; write failures are logged and otherwise swallowed.
    pub fn save(&self, bins: &Bins) {
        if !self.available {
            return;
        }
        let snapshot = PersistedState::new(bins.clone());
        if let Err(err) = self.write_snapshot(&snapshot) {
            warn!("Failed to write {}: {err:#}", self.path.display());
        }
    }

    fn read_snapshot(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    fn write_snapshot(&self, snapshot: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialised = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, serialised)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

// Mirror of the original localStorage feature test: write and remove a
// probe file instead of a probe key.
fn probe(root: &Path) -> bool {
    if fs::create_dir_all(root).is_err() {
        return false;
    }
    let probe_path = root.join(".probe");
    match fs::write(&probe_path, b"probe") {
        Ok(()) => {
            let _ = fs::remove_file(&probe_path);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BinId, Card};
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = StateFile::new(dir.path());
        assert!(store.available());

        let mut bins = Bins::default();
        bins.get_mut(BinId::VeryImportant)
            .push(Card::new("Honesty", "Being truthful"));
        store.save(&bins);

        let loaded = store.load().expect("snapshot present");
        assert_eq!(loaded.bins, bins);
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn missing_file_is_a_fresh_session() {
        let dir = tempdir().unwrap();
        let store = StateFile::new(dir.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn malformed_blob_is_discarded_silently() {
        let dir = tempdir().unwrap();
        let store = StateFile::new(dir.path());
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_none());

        // Valid JSON of the wrong shape is equally a fresh session.
        fs::write(store.path(), "{\"bins\": 7}").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn blob_without_timestamp_still_loads() {
        let dir = tempdir().unwrap();
        let store = StateFile::new(dir.path());
        fs::write(
            store.path(),
            r#"{"bins":{"veryImportant":[{"name":"Honesty","description":"Being truthful"}],"somewhatImportant":[],"notImportant":[]}}"#,
        )
        .unwrap();
        let loaded = store.load().expect("minimal shape accepted");
        assert_eq!(loaded.bins.count(BinId::VeryImportant), 1);
        assert!(loaded.saved_at.is_none());
    }

    #[test]
    fn unavailable_storage_degrades_to_no_ops() {
        let dir = tempdir().unwrap();
        // A file where the directory should be makes the probe fail.
        let blocked = dir.path().join("occupied");
        fs::write(&blocked, b"file").unwrap();

        let store = StateFile::new(&blocked);
        assert!(!store.available());
        assert!(store.load().is_none());

        let mut bins = Bins::default();
        bins.get_mut(BinId::NotImportant)
            .push(Card::new("Fame", "Being well known"));
        store.save(&bins); // must not panic or create anything
        assert!(!blocked.join(format!("{SAVE_KEY}.json")).exists());
    }
}
