//=========================================================================
// TTL Cache
//=========================================================================
//
// Read-through cache in front of the backend. Entries expire a fixed time
// after their last insert; expired entries are evicted lazily on lookup.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

//=== Internal Dependencies ===============================================

use super::key::StorageKey;

//=== TtlCache ============================================================

pub(crate) struct TtlCache {
    entries: HashMap<StorageKey, (Value, Instant)>,
    ttl: Duration,
}

impl TtlCache {
    pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub(crate) fn get(&mut self, key: &StorageKey) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &StorageKey, now: Instant) -> Option<Value> {
        let (value, inserted) = self.entries.get(key)?;
        if now.saturating_duration_since(*inserted) < self.ttl {
            return Some(value.clone());
        }

        self.entries.remove(key);
        None
    }

    pub(crate) fn insert(&mut self, key: StorageKey, value: Value) {
        self.entries.insert(key, (value, Instant::now()));
    }

    pub(crate) fn remove(&mut self, key: &StorageKey) {
        self.entries.remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
