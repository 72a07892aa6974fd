use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use treestats_core::Result;

/// Key-value store the aggregation engine caches into.
///
/// Keys are opaque strings. A store failure is a hard failure and must be
/// reported as an error, never as a miss; an implementation that swallows
/// errors as misses only costs redundant recomputation, but that choice
/// belongs to the implementation, not this contract.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Hit/miss bookkeeping for [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub deletions: u64,
    pub entries: usize,
}

impl StoreStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Thread-safe in-memory reference store.
///
/// No TTL and no eviction; entries live until deleted. Serves as the
/// deterministic fixture for tests and as the single-process default.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
    stats: Mutex<StoreStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the store counters.
    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.entries.len();
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        let mut stats = self.stats.lock();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(found)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.stats.lock().deletions += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_delete_round_trip() {
        let store = MemoryStore::new();

        store.set("k", json!(42)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(42)));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", json!(1)).unwrap();

        store.delete("k").unwrap();
        store.delete("k").unwrap();

        assert_eq!(store.stats().deletions, 1);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let store = MemoryStore::new();
        store.set("k", json!(1)).unwrap();

        store.get("k").unwrap();
        store.get("absent").unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
