//=========================================================================
// Storage Backends
//=========================================================================
//
// Key-value stores behind the data manager.
//
//   StorageBackend (trait)
//     ├─ FileBackend:   <data_dir>/WoodcatGameDB/gameData.json
//     └─ MemoryBackend: process-local map
//
// The file backend keeps an in-memory mirror of the object store and
// rewrites the whole file on every mutation (temp file + rename), so a
// crash mid-write leaves the previous file intact.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::key::{StorageKey, StoredRecord};

//=== StorageError ========================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for {key} is corrupt: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("object store {path} is corrupt: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage writer is not running")]
    WriterStopped,
}

//=== StorageBackend ======================================================

/// Durable key-value store for [`StoredRecord`]s.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &StorageKey) -> Result<Option<StoredRecord>, StorageError>;

    fn put(&self, record: StoredRecord) -> Result<(), StorageError>;

    /// Writes a batch. Backends that persist per call should override this.
    fn put_many(&self, records: Vec<StoredRecord>) -> Result<(), StorageError> {
        for record in records {
            self.put(record)?;
        }
        Ok(())
    }

    /// Removes a key. Returns whether it existed.
    fn delete(&self, key: &StorageKey) -> Result<bool, StorageError>;

    fn name(&self) -> &'static str;
}

//=== MemoryBackend =======================================================

#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<BTreeMap<String, StoredRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &StorageKey) -> Result<Option<StoredRecord>, StorageError> {
        Ok(self.records.lock().get(&key.to_string()).cloned())
    }

    fn put(&self, record: StoredRecord) -> Result<(), StorageError> {
        self.records.lock().insert(record.key.clone(), record);
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        Ok(self.records.lock().remove(&key.to_string()).is_some())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

//=== FileBackend =========================================================

/// JSON object store on disk.
///
/// Entries are kept as raw JSON so one corrupt record does not poison the
/// rest of the store; it surfaces as [`StorageError::Decode`] on read.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileBackend {
    pub const DATABASE_DIR: &'static str = "WoodcatGameDB";
    pub const OBJECT_STORE: &'static str = "gameData";

    /// Opens (or creates) the store under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = data_dir.as_ref().join(Self::DATABASE_DIR);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", Self::OBJECT_STORE));
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|source| StorageError::CorruptStore {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(target: "storage", "Opened {} ({} records)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Encode {
            key: Self::OBJECT_STORE.to_string(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(target: "storage", "Persisted {} records to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn encode(record: &StoredRecord) -> Result<Value, StorageError> {
        serde_json::to_value(record).map_err(|source| StorageError::Encode {
            key: record.key.clone(),
            source,
        })
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &StorageKey) -> Result<Option<StoredRecord>, StorageError> {
        let name = key.to_string();
        let Some(raw) = self.entries.lock().get(&name).cloned() else {
            return Ok(None);
        };

        serde_json::from_value(raw)
            .map(Some)
            .map_err(|source| StorageError::Decode { key: name, source })
    }

    fn put(&self, record: StoredRecord) -> Result<(), StorageError> {
        self.put_many(vec![record])
    }

    fn put_many(&self, records: Vec<StoredRecord>) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        // The mirror only changes once the file write has succeeded.
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        for record in &records {
            next.insert(record.key.clone(), Self::encode(record)?);
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let mut entries = self.entries.lock();
        let name = key.to_string();
        if !entries.contains_key(&name) {
            return Ok(false);
        }

        let mut next = entries.clone();
        next.remove(&name);
        self.persist(&next)?;
        *entries = next;
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
