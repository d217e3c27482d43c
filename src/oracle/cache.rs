use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Per-run memo cache for point-in-time facts (historical balances, market
/// risk assessments). Entries are never invalidated within a run: the cached
/// values are read-only facts for a fixed historical reference.
///
/// The lock is only held for map access, never across an await, so the cache
/// stays sound if wallet evaluation is ever fanned out.
#[derive(Debug, Default)]
pub struct MemoCache<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner
            .lock()
            .expect("memo cache lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner
            .lock()
            .expect("memo cache lock poisoned")
            .insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("memo cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
