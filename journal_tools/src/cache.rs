use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use log::trace;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// A small in-memory cache whose entries expire a fixed time after they were stored.
///
/// Clones share the same store.
#[derive(Debug, Clone)]
pub struct TtlCache<V: Clone> {
    ttl: Duration,
    store: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, store: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        {
            let store = self.store.read().unwrap_or_else(|e| e.into_inner());
            match store.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {},
            }
        }
        trace!("Cache entry {key} has expired");
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.remove(key);
        None
    }

    /// Stores `value` under `key`. Expired entries are dropped on the way, so keys that are never read again do not
    /// pile up.
    pub fn insert(&self, key: &str, value: V) {
        let entry = CacheEntry { value, expires_at: Instant::now() + self.ttl };
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.retain(|_, e| !e.is_expired());
        store.insert(key.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, key: &str) {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.remove(key);
    }

    pub fn clear(&self) {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.clear();
    }
}
