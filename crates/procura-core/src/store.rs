//! Generic in-memory session store with optional TTL.
//!
//! Expiry is lazy: an entry past its TTL is dropped on the next read of
//! that key, so memory for expired-but-unread keys is reclaimed only when
//! that key is touched again. Writes unconditionally overwrite and restamp
//! the entry. The store assumes a single logical owner per key; concurrent
//! read-modify-write sequences on the same key are not serialized here —
//! the workflows' optimistic version check is the only mutation-ordering
//! device.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

struct Entry<T> {
    value: T,
    written_at: Instant,
}

/// Keyed store of session records with optional time-to-live.
pub struct SessionStore<T> {
    entries: DashMap<String, Entry<T>>,
    ttl: Option<Duration>,
}

impl<T: Clone> SessionStore<T> {
    /// Create a store. `ttl = None` means entries never expire.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a record, treating expired entries as absent (and dropping them).
    pub fn get(&self, key: &str) -> Option<T> {
        if let Some(ttl) = self.ttl {
            // Two-phase check: the read guard must be released before remove,
            // or DashMap deadlocks on the shard lock.
            let expired = match self.entries.get(key) {
                Some(entry) => entry.written_at.elapsed() >= ttl,
                None => return None,
            };
            if expired {
                self.entries.remove(key);
                debug!(target: "procura::store", "dropped expired entry {key}");
                return None;
            }
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Write a record, overwriting any existing value and restamping its
    /// last-write time. Always succeeds.
    pub fn set(&self, key: &str, value: T) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                written_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, counting expired-but-unread keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
