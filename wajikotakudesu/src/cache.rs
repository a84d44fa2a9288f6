//! In-memory cache with per-entry TTL
//!
//! Values are stored type-erased; [`CacheStore::get`] hands back a clone of
//! the stored value when it is still fresh and of the requested type.
//! Expired entries are dropped when they are read, there is no background
//! sweeper. Keys are page routes and server ids, so the key set stays
//! bounded in practice; nothing enforces it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    /// `None` means the entry lives until the process stops
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

/// Process-wide key → value table
///
/// Created once at startup and shared through an `Arc`. Writes overwrite
/// unconditionally (last writer wins), so concurrent callers never observe
/// a partially updated entry.
#[derive(Default)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value stored under `key`
    ///
    /// An expired entry is removed and reported as absent. An entry holding
    /// another type is reported as absent and left in place.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Instant::now();

        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if !entry.is_expired(now) {
                return entry.value.downcast_ref::<T>().cloned();
            }
        }

        // Expired: evict, unless a writer refreshed it in between
        if let Ok(mut entries) = self.entries.write() {
            if entries.get(key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(key);
                tracing::trace!(key, "Evicted expired cache entry");
            }
        }
        None
    }

    /// Stores `value` under `key`, replacing any previous entry
    ///
    /// `ttl = None` keeps the entry until the process stops.
    pub fn put<T>(&self, key: impl Into<String>, value: T, ttl: Option<Duration>)
    where
        T: Send + Sync + 'static,
    {
        let entry = CacheEntry {
            value: Arc::new(value),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), entry);
        }
    }

    /// Drops the entry stored under `key`
    pub fn remove(&self, key: &str) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.len())
            .finish()
    }
}
