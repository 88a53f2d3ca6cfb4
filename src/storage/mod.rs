//=========================================================================
// Storage
//=========================================================================
//
// Namespaced key-value persistence shared by every game.
//
// Components:
// - `key`: typed keys and the stored record envelope
// - `backend`: file and memory stores
// - `cache`: TTL read cache
// - `writer`: debounced write-behind thread
// - `manager`: the `DataManager` facade
//
//=========================================================================

//=== Module Declarations =================================================

mod backend;
mod cache;
mod key;
mod manager;
mod writer;

//=== Public API ==========================================================

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use key::{DataType, GameId, StorageKey, StoredRecord};
pub use manager::{DataManager, StorageOptions};
pub use writer::DebounceProfile;
