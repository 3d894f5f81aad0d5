//! Cache-aside helpers for post queries
//!
//! [`QueryCache`] wraps a [`CacheStore`] so that nothing the cache does can fail a
//! request: lookups degrade to a miss, writes and invalidations are best-effort
//! and only logged and counted.

pub mod keys;
pub mod policy;

pub use policy::{InvalidationScope, TtlPolicy};

use crate::metrics;
use cache_store::CacheStore;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of probing the cache for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
    /// The store call failed
    Error,
    /// A payload was present but did not deserialize
    Corrupt,
}

impl<T> Lookup<T> {
    pub fn outcome(&self) -> &'static str {
        match self {
            Lookup::Hit(_) => "hit",
            Lookup::Miss => "miss",
            Lookup::Error => "error",
            Lookup::Corrupt => "corrupt",
        }
    }

    pub fn into_hit(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// Outcome of a fire-and-forget cache write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestEffort {
    Applied,
    Failed,
}

#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Probe `key` and decode its JSON payload. Never returns an error.
    pub async fn lookup<T: DeserializeOwned>(&self, query: &'static str, key: &str) -> Lookup<T> {
        let lookup = match self.store.get(key).await {
            Ok(Some(raw)) if !raw.is_empty() => match serde_json::from_str::<T>(&raw) {
                Ok(value) => Lookup::Hit(value),
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache payload");
                    Lookup::Corrupt
                }
            },
            Ok(_) => Lookup::Miss,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, falling back to database");
                Lookup::Error
            }
        };

        debug!(query, key, outcome = lookup.outcome(), "Cache lookup");
        metrics::record_cache_lookup(query, lookup.outcome());
        lookup
    }

    /// Store `value` as JSON under `key`.
    pub async fn populate<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> BestEffort {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Cache payload serialization failed");
                metrics::record_best_effort_failure("populate");
                return BestEffort::Failed;
            }
        };

        match self.store.set(key, &payload, ttl).await {
            Ok(()) => BestEffort::Applied,
            Err(e) => {
                warn!(key, error = %e, "Cache populate failed");
                metrics::record_best_effort_failure("populate");
                BestEffort::Failed
            }
        }
    }

    /// Delete every key matching each pattern. Later patterns still run if one fails.
    pub async fn invalidate(&self, patterns: &[String]) -> BestEffort {
        let mut result = BestEffort::Applied;
        for pattern in patterns {
            match self.store.delete_by_pattern(pattern).await {
                Ok(deleted) => debug!(pattern = %pattern, deleted, "Cache invalidated"),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Cache invalidation failed");
                    metrics::record_best_effort_failure("invalidate");
                    result = BestEffort::Failed;
                }
            }
        }
        result
    }
}
