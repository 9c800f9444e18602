//! DocumentStore owns the single `CvData` value and its persisted record.
//!
//! Persistence is a named key-value record (`cv_data`) holding the JSON
//! document. A missing or unreadable record always loads as an empty document.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::address::{normalize_skills, try_apply, FieldAddress};
use crate::document::session::Commit;
use crate::models::cv::{CvData, FieldValue};

/// Key of the persisted document record.
pub const STORAGE_KEY: &str = "cv_data";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stored document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key-value storage, one record per key.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write-then-rename so a crash mid-write never leaves a torn record.
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DocumentStore
// ────────────────────────────────────────────────────────────────────────────

/// Result of routing an edit-session commit into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOutcome {
    Applied,
    /// The address did not resolve or the value was already committed.
    Unchanged,
    /// The session was opened before the last reset; the edit is discarded.
    Stale,
}

/// Owner of the canonical document.
///
/// Snapshots are immutable `Arc<CvData>` values; every committed mutation swaps
/// in a new `Arc`, so `Arc::ptr_eq` is a valid change check.
pub struct DocumentStore {
    storage: Arc<dyn Storage>,
    current: Arc<CvData>,
    /// Bumped on every reset. Edit state opened under an older epoch is stale.
    epoch: u64,
    /// Bumped on every replaced snapshot.
    revision: u64,
}

impl DocumentStore {
    /// Opens the store and restores the persisted document, if any.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let mut store = Self {
            storage,
            current: Arc::new(CvData::empty()),
            epoch: 0,
            revision: 0,
        };
        store.current = Arc::new(store.load());
        store
    }

    /// Reads the persisted snapshot. Missing or malformed storage yields an
    /// empty document; the failure is logged, never returned.
    pub fn load(&self) -> CvData {
        match self.read_record() {
            Ok(Some(doc)) => {
                debug!("Restored persisted document");
                normalized(doc)
            }
            Ok(None) => {
                info!("No saved document; starting empty");
                CvData::empty()
            }
            Err(e) => {
                warn!("Discarding saved document: {e}");
                CvData::empty()
            }
        }
    }

    fn read_record(&self) -> Result<Option<CvData>, StorageError> {
        match self.storage.read(STORAGE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes and persists `doc`. Failures are logged; the in-memory
    /// document stays authoritative.
    pub fn save(&self, doc: &CvData) {
        let result = serde_json::to_string(doc)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!("Failed to persist document: {e}");
        }
    }

    /// Clears the persisted record and starts over with an empty document.
    /// Bumps the epoch so editors holding pre-reset state discard it.
    pub fn reset(&mut self) -> CvData {
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            warn!("Failed to clear saved document: {e}");
        }
        self.current = Arc::new(CvData::empty());
        self.epoch += 1;
        self.revision += 1;
        info!("Document reset (epoch {})", self.epoch);
        CvData::empty()
    }

    /// Atomically replaces the whole document and persists it.
    pub fn replace(&mut self, doc: CvData) {
        let doc = normalized(doc);
        self.save(&doc);
        self.current = Arc::new(doc);
        self.revision += 1;
    }

    /// Applies one field write. Returns false when nothing changed.
    pub fn write_field(&mut self, address: &FieldAddress, value: &FieldValue) -> bool {
        match try_apply(&self.current, address, value) {
            Ok(next) if next != *self.current => {
                self.replace(next);
                true
            }
            Ok(_) => false,
            Err(miss) => {
                debug!(?address, ?miss, "Field write dropped");
                false
            }
        }
    }

    /// Routes an edit-session commit, discarding it if it predates a reset.
    pub fn commit(&mut self, commit: &Commit) -> CommitOutcome {
        if commit.epoch != self.epoch {
            debug!(
                "Discarding edit from epoch {} (current {})",
                commit.epoch, self.epoch
            );
            return CommitOutcome::Stale;
        }
        if self.write_field(&commit.address, &commit.value) {
            CommitOutcome::Applied
        } else {
            CommitOutcome::Unchanged
        }
    }

    pub fn snapshot(&self) -> Arc<CvData> {
        Arc::clone(&self.current)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Brings skills that arrived whole (replacement, legacy records) into the
/// one-piece-per-entry form the skills field edits.
fn normalized(mut doc: CvData) -> CvData {
    if doc.skills.iter().any(|s| s.contains(',') || s.trim() != s.as_str() || s.is_empty()) {
        doc.skills = normalize_skills(&doc.skills);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::address::current_value;
    use crate::models::cv::{Education, EntitySection, Experience, Project};

    fn populated() -> CvData {
        let mut doc = CvData::empty();
        doc.personal_info.full_name = "Grace Hopper".to_string();
        doc.personal_info.profile_picture = Some("https://example.com/me.png".to_string());
        doc.summary = "Compiler pioneer.\nRear admiral.".to_string();
        doc.experience.push(Experience {
            id: "e1".to_string(),
            company: "US Navy".to_string(),
            position: "Officer".to_string(),
            start_date: "1943-12".to_string(),
            end_date: "1986-08".to_string(),
            current: false,
            description: "Line one\nLine two".to_string(),
        });
        doc.education.push(Education {
            id: "d1".to_string(),
            institution: "Yale".to_string(),
            degree: "PhD Mathematics".to_string(),
            start_date: "Fall 1930".to_string(),
            current: true,
            ..Education::default()
        });
        doc.projects.push(Project {
            id: "p1".to_string(),
            name: "COBOL".to_string(),
            link: "https://example.com/cobol".to_string(),
            ..Project::default()
        });
        doc.skills = vec!["FLOW-MATIC".to_string(), "Leadership".to_string()];
        doc
    }

    #[test]
    fn test_load_after_save_round_trips() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let store = DocumentStore::open(Arc::clone(&storage));
        let doc = populated();

        store.save(&doc);
        assert_eq!(store.load(), doc);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(dir.path()).unwrap());
        let mut store = DocumentStore::open(Arc::clone(&storage));
        store.replace(populated());

        let reopened = DocumentStore::open(storage);
        assert_eq!(*reopened.snapshot(), populated());
        assert!(dir.path().join("cv_data.json").exists());
    }

    #[test]
    fn test_stored_skills_survive_untouched_skills_edit() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut store = DocumentStore::open(Arc::clone(&storage));
        let mut doc = populated();
        doc.skills = vec!["C, C++".to_string(), " Go ".to_string()];
        store.replace(doc);
        assert_eq!(store.snapshot().skills, vec!["C", "C++", "Go"]);

        let address = FieldAddress::skills();
        let seeded = current_value(&store.snapshot(), &address).unwrap();
        assert!(!store.write_field(&address, &seeded));

        let mut legacy = populated();
        legacy.skills = vec!["Rust,SQL".to_string()];
        storage
            .write(STORAGE_KEY, &serde_json::to_string(&legacy).unwrap())
            .unwrap();
        let reopened = DocumentStore::open(storage);
        assert_eq!(reopened.snapshot().skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_load_missing_record_is_empty() {
        let store = DocumentStore::open(Arc::new(MemoryStorage::default()));
        assert_eq!(store.load(), CvData::empty());
    }

    #[test]
    fn test_load_malformed_record_is_empty() {
        let storage = Arc::new(MemoryStorage::default());
        storage.write(STORAGE_KEY, "{not json").unwrap();
        let store = DocumentStore::open(storage);

        assert_eq!(*store.snapshot(), CvData::empty());
    }

    #[test]
    fn test_reset_clears_storage_and_bumps_epoch() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut store = DocumentStore::open(Arc::clone(&storage));
        store.replace(populated());
        let epoch = store.epoch();

        let fresh = store.reset();

        assert_eq!(fresh, CvData::empty());
        assert_eq!(*store.snapshot(), CvData::empty());
        assert_eq!(store.epoch(), epoch + 1);
        assert!(storage.read(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let mut store = DocumentStore::open(Arc::new(MemoryStorage::default()));
        let before = store.snapshot();
        store.replace(populated());
        let after = store.snapshot();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, CvData::empty());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_write_field_persists() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut store = DocumentStore::open(Arc::clone(&storage));
        store.replace(populated());

        let address = FieldAddress::keyed(EntitySection::Experience, "e1", "company");
        assert!(store.write_field(&address, &FieldValue::Text("Harvard".to_string())));

        let reloaded = DocumentStore::open(storage);
        assert_eq!(reloaded.snapshot().experience[0].company, "Harvard");
    }

    #[test]
    fn test_write_field_miss_keeps_snapshot() {
        let mut store = DocumentStore::open(Arc::new(MemoryStorage::default()));
        store.replace(populated());
        let before = store.snapshot();

        let address = FieldAddress::keyed(EntitySection::Projects, "gone", "name");
        assert!(!store.write_field(&address, &FieldValue::Text("x".to_string())));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_commit_from_previous_epoch_is_stale() {
        let mut store = DocumentStore::open(Arc::new(MemoryStorage::default()));
        let commit = Commit {
            address: FieldAddress::summary(),
            value: FieldValue::Text("Old session".to_string()),
            epoch: store.epoch(),
        };
        store.reset();

        assert_eq!(store.commit(&commit), CommitOutcome::Stale);
        assert_eq!(store.snapshot().summary, "");
    }
}
