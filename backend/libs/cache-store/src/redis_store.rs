//! Redis-backed store
//!
//! A single `ConnectionManager` is cloned per call; clones share the underlying
//! multiplexed connection and reconnect transparently. Every command is bounded
//! by `op_timeout` so a stalled Redis cannot pin a request.

use crate::{
    ensure_key, ensure_pattern, ensure_window, CacheStore, CounterStore, StoreError, StoreResult,
    SCAN_BATCH_SIZE,
};
use anyhow::Context;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Cache and counter store over Redis
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    /// Open a managed connection to `redis_url`.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::open(redis_url).context("failed to parse REDIS_URL connection string")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;
        Ok(Self::new(conn, op_timeout))
    }

    /// Round-trip a PING, used by readiness checks.
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = self
            .bounded("ping", async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING response",
            ))))
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::Redis),
            Err(_) => {
                warn!(operation, timeout = ?self.op_timeout, "Redis operation timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.op_timeout,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        ensure_key(key)?;
        let mut conn = self.conn.clone();
        self.bounded("get", async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        ensure_key(key)?;
        let mut conn = self.conn.clone();
        self.bounded("set", async move {
            if ttl.is_zero() {
                conn.set::<_, _, ()>(key, value).await
            } else {
                conn.pset_ex::<_, _, ()>(key, value, ttl.as_millis() as u64)
                    .await
            }
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        ensure_key(key)?;
        let mut conn = self.conn.clone();
        self.bounded("del", async move { conn.del::<_, ()>(key).await })
            .await
    }

    async fn delete_by_pattern(&self, pattern: &str) -> StoreResult<usize> {
        ensure_pattern(pattern)?;

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            // SCAN, never KEYS
            let mut conn = self.conn.clone();
            let (next_cursor, batch): (u64, Vec<String>) = self
                .bounded("scan", async move {
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH_SIZE)
                        .query_async(&mut conn)
                        .await
                })
                .await?;

            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();

        let mut conn = self.conn.clone();
        let deleted: usize = self
            .bounded("del", async move { conn.del::<_, usize>(&keys).await })
            .await?;

        debug!(pattern = %pattern, deleted, "Cache scan delete");
        Ok(deleted)
    }
}

#[async_trait::async_trait]
impl CounterStore for RedisStore {
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> StoreResult<i64> {
        ensure_key(key)?;
        ensure_window(window)?;

        let window_ms = window.as_millis() as i64;
        let mut conn = self.conn.clone();
        let (count,): (i64,) = self
            .bounded("incr_with_expiry", async move {
                redis::pipe()
                    .atomic()
                    .incr(key, 1)
                    .pexpire(key, window_ms)
                    .ignore()
                    .query_async(&mut conn)
                    .await
            })
            .await?;
        Ok(count)
    }

    async fn count(&self, key: &str) -> StoreResult<Option<i64>> {
        ensure_key(key)?;
        let mut conn = self.conn.clone();
        self.bounded("get", async move { conn.get::<_, Option<i64>>(key).await })
            .await
    }

    async fn clear(&self, key: &str) -> StoreResult<()> {
        CacheStore::delete(self, key).await
    }
}
