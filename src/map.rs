//! Bounded key/value table with lazy per-entry expiry
//!
//! Every entry remembers when it was last set. Once older than the table's
//! ttl it is treated as absent and removed the next time it is touched;
//! nothing sweeps the table in the background.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    refreshed: Instant,
}

#[derive(Debug, Clone)]
pub struct TtlMap<K, V> {
    entries: HashMap<K, Entry<V>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl<K: Eq + Hash + Copy, V> TtlMap<K, V> {
    /// `ttl` of `None` keeps entries until they are removed.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        TtlMap {
            entries: HashMap::new(),
            capacity,
            ttl,
        }
    }

    fn is_expired(&self, refreshed: Instant, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(refreshed) >= ttl,
            None => false,
        }
    }

    /// Drop `key` if its entry has expired.
    fn evict_if_expired(&mut self, key: &K, now: Instant) {
        let expired = match self.entries.get(key) {
            Some(entry) => self.is_expired(entry.refreshed, now),
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
    }

    pub fn get(&mut self, key: &K, now: Instant) -> Option<&V> {
        self.evict_if_expired(key, now);
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &K, now: Instant) -> Option<&mut V> {
        self.evict_if_expired(key, now);
        self.entries.get_mut(key).map(|entry| &mut entry.value)
    }

    pub fn contains(&mut self, key: &K, now: Instant) -> bool {
        self.get(key, now).is_some()
    }

    /// Insert or refresh `key`.
    ///
    /// Fails only when the key is new and the table is still full after
    /// expired entries have been purged.
    pub fn set(&mut self, key: K, value: V, now: Instant) -> Result<()> {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge(now);
            if self.entries.len() >= self.capacity {
                return Err(Error::TableFull {
                    capacity: self.capacity,
                });
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                refreshed: now,
            },
        );
        Ok(())
    }

    /// Remove `key`, returning its value if it had not expired.
    pub fn remove(&mut self, key: &K, now: Instant) -> Option<V> {
        self.evict_if_expired(key, now);
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Visit every live entry together with the time it was last set.
    pub fn iter(&self, now: Instant) -> impl Iterator<Item = (&K, &V, Instant)> + '_ {
        self.entries
            .iter()
            .filter(move |(_, entry)| !self.is_expired(entry.refreshed, now))
            .map(|(key, entry)| (key, &entry.value, entry.refreshed))
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| match ttl {
            Some(ttl) => now.saturating_duration_since(entry.refreshed) < ttl,
            None => true,
        });
    }
}
