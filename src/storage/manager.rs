//=========================================================================
// Data Manager
//=========================================================================
//
// The one persistence entry point every game uses.
//
// Write path:
//   save_data() → TTL cache → WriteCommand::Save → worker (debounced)
//   save_data_immediate() → TTL cache → WriteCommand::Immediate (blocking)
//
// Read path:
//   load_data() → TTL cache → backend → default
//
// Read and decode failures never reach the caller: they are logged and
// the caller's default is returned.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Sender};
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

//=== Internal Dependencies ===============================================

use super::backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
use super::cache::TtlCache;
use super::key::{DataType, GameId, StorageKey, StoredRecord};
use super::writer::{DebounceProfile, WriteBehindWorker, WriteCommand};
use crate::config::{BackendKind, StorageConfig};

//=== StorageOptions ======================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageOptions {
    pub debounce: Duration,
    pub cache_ttl: Duration,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            debounce: DebounceProfile::Desktop.delay(),
            cache_ttl: TtlCache::DEFAULT_TTL,
        }
    }
}

impl From<&StorageConfig> for StorageOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            debounce: config.debounce.delay(),
            cache_ttl: config.cache_ttl(),
        }
    }
}

//=== DataManager =========================================================

/// Cached, debounced key-value persistence.
///
/// Share it between scenes behind an `Arc`. Dropping the last handle
/// flushes pending writes and joins the worker thread.
pub struct DataManager {
    backend: Arc<dyn StorageBackend>,
    cache: Mutex<TtlCache>,
    writer: Sender<WriteCommand>,
    worker: Option<JoinHandle<()>>,
}

impl DataManager {
    //--- Construction -----------------------------------------------------

    pub fn new(backend: Arc<dyn StorageBackend>, options: StorageOptions) -> Result<Self, StorageError> {
        let (writer, receiver) = unbounded();
        let worker = WriteBehindWorker::spawn(Arc::clone(&backend), receiver, options.debounce)?;

        info!(
            target: "storage",
            "Data manager ready ({} backend, debounce {:?}, ttl {:?})",
            backend.name(),
            options.debounce,
            options.cache_ttl
        );

        Ok(Self {
            backend,
            cache: Mutex::new(TtlCache::new(options.cache_ttl)),
            writer,
            worker: Some(worker),
        })
    }

    /// Opens the configured backend, falling back to memory if the file
    /// store cannot be opened.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        let backend: Arc<dyn StorageBackend> = match config.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::File => match FileBackend::open(&config.data_dir) {
                Ok(file) => Arc::new(file),
                Err(e) => {
                    warn!(target: "storage", "File storage unavailable ({}), using memory", e);
                    Arc::new(MemoryBackend::new())
                }
            },
        };

        Self::new(backend, StorageOptions::from(config))
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(Arc::new(MemoryBackend::new()), StorageOptions::default())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    //--- Writes -----------------------------------------------------------

    /// Caches `value` and schedules a debounced write.
    pub fn save_data<T: Serialize>(
        &self,
        game: GameId,
        data_type: DataType,
        value: &T,
    ) -> Result<(), StorageError> {
        let key = StorageKey::new(game, data_type);
        let data = encode(key, value)?;

        self.cache.lock().insert(key, data.clone());
        self.writer
            .send(WriteCommand::Save(key, StoredRecord::new(key, data)))
            .map_err(|_| StorageError::WriterStopped)
    }

    /// Writes `value` now and waits for the backend.
    ///
    /// Any pending debounced write for the same key is discarded.
    pub fn save_data_immediate<T: Serialize>(
        &self,
        game: GameId,
        data_type: DataType,
        value: &T,
    ) -> Result<(), StorageError> {
        let key = StorageKey::new(game, data_type);
        let data = encode(key, value)?;

        self.cache.lock().insert(key, data.clone());

        let (ack, done) = bounded(1);
        let result = self
            .writer
            .send(WriteCommand::Immediate(key, StoredRecord::new(key, data), ack))
            .map_err(|_| StorageError::WriterStopped)
            .and_then(|()| done.recv().map_err(|_| StorageError::WriterStopped)?);

        // A value the backend rejected must not be served from the cache.
        if result.is_err() {
            self.cache.lock().remove(&key);
        }
        result
    }

    /// Removes a key from cache, pending writes and the backend.
    pub fn delete_data(&self, game: GameId, data_type: DataType) -> Result<bool, StorageError> {
        let key = StorageKey::new(game, data_type);
        self.cache.lock().remove(&key);

        let (ack, done) = bounded(1);
        self.writer
            .send(WriteCommand::Delete(key, ack))
            .map_err(|_| StorageError::WriterStopped)?;
        done.recv().map_err(|_| StorageError::WriterStopped)?
    }

    /// Blocks until every pending write has reached the backend.
    pub fn flush(&self) -> Result<(), StorageError> {
        let (ack, done) = bounded(1);
        self.writer
            .send(WriteCommand::Flush(ack))
            .map_err(|_| StorageError::WriterStopped)?;
        done.recv().map_err(|_| StorageError::WriterStopped)?
    }

    //--- Reads ------------------------------------------------------------

    /// Loads a value, returning `default` when missing or unreadable.
    pub fn load_data<T: DeserializeOwned>(&self, game: GameId, data_type: DataType, default: T) -> T {
        let key = StorageKey::new(game, data_type);

        match self.try_load(key) {
            Ok(Some(data)) => match serde_json::from_value(data) {
                Ok(value) => value,
                Err(e) => {
                    warn!(target: "storage", "Discarding unreadable value for {}: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                error!(target: "storage", "Load failed for {}: {}", key, e);
                default
            }
        }
    }

    fn try_load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        if let Some(data) = self.cache.lock().get(&key) {
            return Ok(Some(data));
        }

        let Some(record) = self.backend.get(&key)? else {
            return Ok(None);
        };

        self.cache.lock().insert(key, record.data.clone());
        Ok(Some(record.data))
    }

    //--- Cache ------------------------------------------------------------

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}

impl Drop for DataManager {
    fn drop(&mut self) {
        let _ = self.writer.send(WriteCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(target: "storage", "Storage worker panicked during shutdown");
            }
        }
    }
}

fn encode<T: Serialize>(key: StorageKey, value: &T) -> Result<Value, StorageError> {
    serde_json::to_value(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        score: u32,
        level: u32,
        tags: Vec<String>,
    }

    fn slow_manager(backend: Arc<dyn StorageBackend>) -> DataManager {
        let options = StorageOptions {
            debounce: Duration::from_secs(60),
            ..StorageOptions::default()
        };
        DataManager::new(backend, options).unwrap()
    }

    //--- Round Trips ------------------------------------------------------

    #[test]
    fn missing_key_returns_default() {
        let manager = DataManager::in_memory().unwrap();
        assert_eq!(manager.load_data(GameId::Snake, DataType::Stats, 11u32), 11);
    }

    #[test]
    fn save_is_visible_through_cache_before_flush() {
        let backend = Arc::new(MemoryBackend::new());
        let manager = slow_manager(backend.clone());

        manager.save_data(GameId::Tetris, DataType::Stats, &42u32).unwrap();

        assert_eq!(manager.load_data(GameId::Tetris, DataType::Stats, 0u32), 42);
        assert!(backend.is_empty());
    }

    #[test]
    fn flush_then_clear_cache_reads_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let manager = slow_manager(backend.clone());
        let snapshot = Snapshot { score: 900, level: 3, tags: vec!["p1".into()] };

        manager.save_data(GameId::TankBattle, DataType::SavedGame, &snapshot).unwrap();
        manager.flush().unwrap();
        manager.clear_cache();

        let default = Snapshot { score: 0, level: 1, tags: vec![] };
        assert_eq!(manager.load_data(GameId::TankBattle, DataType::SavedGame, default), snapshot);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn decode_failure_returns_default() {
        let manager = DataManager::in_memory().unwrap();
        manager.save_data(GameId::Sudoku, DataType::Stats, &"not a number").unwrap();

        assert_eq!(manager.load_data(GameId::Sudoku, DataType::Stats, 5u32), 5);
    }

    #[test]
    fn immediate_write_lands_without_flush() {
        let backend = Arc::new(MemoryBackend::new());
        let manager = slow_manager(backend.clone());

        manager.save_data(GameId::TankBattle, DataType::SavedGame, &1u32).unwrap();
        manager.save_data_immediate(GameId::TankBattle, DataType::SavedGame, &2u32).unwrap();

        let key = StorageKey::new(GameId::TankBattle, DataType::SavedGame);
        assert_eq!(backend.get(&key).unwrap().unwrap().data, serde_json::json!(2));

        manager.flush().unwrap();
        assert_eq!(backend.get(&key).unwrap().unwrap().data, serde_json::json!(2));
    }

    #[test]
    fn delete_removes_everywhere() {
        let manager = DataManager::in_memory().unwrap();
        manager.save_data_immediate(GameId::Gomoku, DataType::Stats, &3u32).unwrap();

        assert!(manager.delete_data(GameId::Gomoku, DataType::Stats).unwrap());
        assert_eq!(manager.load_data(GameId::Gomoku, DataType::Stats, 0u32), 0);
    }

    #[test]
    fn drop_flushes_pending_writes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = Arc::new(FileBackend::open(dir.path()).unwrap());
            let manager = slow_manager(backend);
            manager.save_data(GameId::Snake, DataType::Settings, &true).unwrap();
        }

        let reopened = DataManager::new(
            Arc::new(FileBackend::open(dir.path()).unwrap()),
            StorageOptions::default(),
        )
        .unwrap();
        assert!(reopened.load_data(GameId::Snake, DataType::Settings, false));
    }

    #[test]
    fn open_falls_back_to_memory_on_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join(FileBackend::DATABASE_DIR);
        std::fs::create_dir_all(&db).unwrap();
        std::fs::write(db.join("gameData.json"), "[[[").unwrap();

        let config = StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        let manager = DataManager::open(&config).unwrap();
        assert_eq!(manager.backend_name(), "memory");
    }

    //--- Properties -------------------------------------------------------

    fn game_strategy() -> impl Strategy<Value = GameId> {
        prop::sample::select(GameId::ALL.to_vec())
    }

    fn data_type_strategy() -> impl Strategy<Value = DataType> {
        prop::sample::select(DataType::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn saved_values_round_trip(
            game in game_strategy(),
            data_type in data_type_strategy(),
            value in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6),
        ) {
            let manager = slow_manager(Arc::new(MemoryBackend::new()));

            manager.save_data(game, data_type, &value).unwrap();
            manager.flush().unwrap();
            prop_assert_eq!(&manager.load_data(game, data_type, BTreeMap::new()), &value);

            manager.clear_cache();
            prop_assert_eq!(&manager.load_data(game, data_type, BTreeMap::new()), &value);
        }
    }
}
