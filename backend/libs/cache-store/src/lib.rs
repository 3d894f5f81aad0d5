//! Key-value stores backing the post service
//!
//! Two capability contracts live here:
//! - [`CacheStore`]: string-keyed values with TTL and glob-pattern deletion
//! - [`CounterStore`]: atomic increment-with-expiry counters for rate limiting
//!
//! Both are implemented by [`RedisStore`] (production) and [`MemoryStore`]
//! (single process, used by tests and local runs). Callers hold them as
//! `Arc<dyn CacheStore>` / `Arc<dyn CounterStore>`.

mod error;
mod memory;
mod pattern;
mod redis_store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pattern::{escape_glob, glob_match};
pub use redis_store::RedisStore;

use std::time::Duration;

/// Keys fetched per SCAN round trip when deleting by pattern
pub const SCAN_BATCH_SIZE: usize = 100;

/// Flat string-keyed cache with per-entry TTL
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. `Ok(None)` means absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a value. A zero `ttl` stores without expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Remove every key matching a glob pattern, returning how many were removed.
    ///
    /// Matching keys are collected with a cursor scan of [`SCAN_BATCH_SIZE`]
    /// keys per round, then removed with a single bulk delete. No match is a no-op.
    async fn delete_by_pattern(&self, pattern: &str) -> StoreResult<usize>;
}

/// Integer counters with expiry
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` by one and (re)set its expiry to `window`, as one atomic unit.
    /// Returns the post-increment count.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> StoreResult<i64>;

    /// Current count, or `None` when the counter does not exist.
    async fn count(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Drop the counter unconditionally.
    async fn clear(&self, key: &str) -> StoreResult<()>;
}

pub(crate) fn ensure_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidArgument(
            "cache key cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_pattern(pattern: &str) -> StoreResult<()> {
    if pattern.is_empty() {
        return Err(StoreError::InvalidArgument(
            "pattern cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_window(window: Duration) -> StoreResult<()> {
    if window.is_zero() {
        return Err(StoreError::InvalidArgument(
            "counter window must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
