//! In-process store
//!
//! Same contracts as [`RedisStore`](crate::RedisStore) over a mutex-guarded map.
//! Expiry is evaluated lazily against `tokio::time::Instant`, so tests can drive
//! windows with a paused clock.

use crate::{
    ensure_key, ensure_pattern, ensure_window, glob_match, CacheStore, CounterStore, StoreError,
    StoreResult, SCAN_BATCH_SIZE,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Cache and counter store held in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map is still structurally valid
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock().get(key).is_some_and(|entry| entry.is_live(now))
    }

    /// Remaining time to live, `None` for absent or non-expiring keys
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.lock();
        let entry = entries.get(key).filter(|entry| entry.is_live(now))?;
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }

    /// One SCAN round over `keys`: up to `count` keys starting at `cursor`, filtered by
    /// `pattern`. Returns the next cursor (0 when exhausted) and the matches.
    /// All rounds of one scan walk the same snapshot.
    fn scan(keys: &[String], cursor: usize, pattern: &str, count: usize) -> (usize, Vec<String>) {
        let end = (cursor + count).min(keys.len());
        let matched = keys[cursor.min(end)..end]
            .iter()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        let next = if end >= keys.len() { 0 } else { end };
        (next, matched)
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        ensure_key(key)?;
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        ensure_key(key)?;
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        ensure_key(key)?;
        self.lock().remove(key);
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> StoreResult<usize> {
        ensure_pattern(pattern)?;

        let snapshot = self.keys();
        let mut matched = Vec::new();
        let mut cursor = 0;
        loop {
            let (next, batch) = Self::scan(&snapshot, cursor, pattern, SCAN_BATCH_SIZE);
            matched.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if matched.is_empty() {
            return Ok(0);
        }

        let mut entries = self.lock();
        let deleted = matched
            .iter()
            .filter(|key| entries.remove(key.as_str()).is_some())
            .count();

        debug!(pattern = %pattern, deleted, "memory store pattern delete");
        Ok(deleted)
    }
}

#[async_trait::async_trait]
impl CounterStore for MemoryStore {
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> StoreResult<i64> {
        ensure_key(key)?;
        ensure_window(window)?;

        let now = Instant::now();
        let mut entries = self.lock();
        let current = match entries.get(key) {
            Some(entry) if entry.is_live(now) => entry.value.parse::<i64>().map_err(|_| {
                StoreError::InvalidArgument(format!("value at '{}' is not an integer", key))
            })?,
            _ => 0,
        };

        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: Some(now + window),
            },
        );
        Ok(next)
    }

    async fn count(&self, key: &str) -> StoreResult<Option<i64>> {
        match CacheStore::get(self, key).await? {
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                StoreError::InvalidArgument(format!("value at '{}' is not an integer", key))
            }),
            None => Ok(None),
        }
    }

    async fn clear(&self, key: &str) -> StoreResult<()> {
        CacheStore::delete(self, key).await
    }
}
