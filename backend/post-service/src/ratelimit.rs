//! Write throttling over a counter store
//!
//! The window is fixed but refreshable: every `allow` call increments the counter and
//! resets its expiry to the full window, so steady traffic keeps extending it. Post
//! keys are additionally bucketed by UTC hour, which resets the count at the top of
//! each hour regardless of expiry.

use async_trait::async_trait;
use cache_store::{CounterStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Default write allowance per client
pub const DEFAULT_POST_LIMIT: u32 = 3;
pub const DEFAULT_POST_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("invalid rate limit request: {0}")]
    InvalidArgument(&'static str),

    /// The counter store could not be reached; distinct from a denial
    #[error("rate limit store failure: {0}")]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `key`. `Ok(false)` once the count exceeds `limit`.
    async fn allow(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError>;

    /// Requests left before denial; `limit` when the key has no counter.
    async fn remaining(&self, key: &str, limit: u32) -> Result<u32, RateLimitError>;

    async fn reset(&self, key: &str) -> Result<(), RateLimitError>;
}

/// Limit and window applied to post creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POST_LIMIT,
            window: DEFAULT_POST_WINDOW,
        }
    }
}

/// `rate_limit:post:{client}:{YYYY-MM-DD-HH}` with the hour taken in UTC
pub fn post_rate_limit_key(client: &str, now: DateTime<Utc>) -> String {
    format!("rate_limit:post:{}:{}", client, now.format("%Y-%m-%d-%H"))
}

/// [`RateLimiter`] backed by any [`CounterStore`]
#[derive(Clone)]
pub struct CounterRateLimiter {
    counters: Arc<dyn CounterStore>,
}

impl CounterRateLimiter {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }
}

fn ensure_key(key: &str) -> Result<(), RateLimitError> {
    if key.is_empty() {
        return Err(RateLimitError::InvalidArgument("key cannot be empty"));
    }
    Ok(())
}

fn ensure_limit(limit: u32) -> Result<(), RateLimitError> {
    if limit == 0 {
        return Err(RateLimitError::InvalidArgument(
            "limit must be greater than 0",
        ));
    }
    Ok(())
}

#[async_trait]
impl RateLimiter for CounterRateLimiter {
    async fn allow(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError> {
        ensure_key(key)?;
        ensure_limit(limit)?;
        if window.is_zero() {
            return Err(RateLimitError::InvalidArgument(
                "window must be greater than 0",
            ));
        }

        let count = self.counters.incr_with_expiry(key, window).await?;
        let allowed = count <= i64::from(limit);
        if !allowed {
            tracing::debug!(key, count, limit, "rate limit exceeded");
        }
        Ok(allowed)
    }

    async fn remaining(&self, key: &str, limit: u32) -> Result<u32, RateLimitError> {
        ensure_key(key)?;
        ensure_limit(limit)?;

        let remaining = match self.counters.count(key).await? {
            None => limit,
            Some(count) => {
                let left = i64::from(limit) - count;
                u32::try_from(left.max(0)).unwrap_or(0)
            }
        };
        Ok(remaining)
    }

    async fn reset(&self, key: &str) -> Result<(), RateLimitError> {
        ensure_key(key)?;
        self.counters.clear(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cache_store::MemoryStore;
    use chrono::TimeZone;

    fn limiter() -> CounterRateLimiter {
        CounterRateLimiter::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_denies() {
        let limiter = limiter();
        let window = Duration::from_secs(3600);
        for _ in 0..3 {
            assert!(limiter.allow("client", 3, window).await.unwrap());
        }
        assert!(!limiter.allow("client", 3, window).await.unwrap());
        assert!(!limiter.allow("client", 3, window).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_key_allowed_after_window() {
        let limiter = limiter();
        let window = Duration::from_secs(2);
        assert!(limiter.allow("client", 2, window).await.unwrap());
        assert!(limiter.allow("client", 2, window).await.unwrap());
        assert!(!limiter.allow("client", 2, window).await.unwrap());

        tokio::time::advance(Duration::from_secs(3)).await;

        assert!(limiter.allow("client", 2, window).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_call_extends_window() {
        let limiter = limiter();
        let window = Duration::from_secs(10);
        assert!(limiter.allow("client", 1, window).await.unwrap());

        // Denied calls still push expiry out
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(6)).await;
            assert!(!limiter.allow("client", 1, window).await.unwrap());
        }

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(limiter.allow("client", 1, window).await.unwrap());
    }

    #[tokio::test]
    async fn test_remaining_and_reset() {
        let limiter = limiter();
        let window = Duration::from_secs(60);
        assert_eq!(limiter.remaining("client", 3).await.unwrap(), 3);

        limiter.allow("client", 3, window).await.unwrap();
        assert_eq!(limiter.remaining("client", 3).await.unwrap(), 2);

        for _ in 0..5 {
            limiter.allow("client", 3, window).await.unwrap();
        }
        assert_eq!(limiter.remaining("client", 3).await.unwrap(), 0);

        limiter.reset("client").await.unwrap();
        assert_eq!(limiter.remaining("client", 3).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_store() {
        let limiter = limiter();
        let window = Duration::from_secs(60);
        assert!(matches!(
            limiter.allow("", 3, window).await,
            Err(RateLimitError::InvalidArgument(_))
        ));
        assert!(matches!(
            limiter.allow("k", 0, window).await,
            Err(RateLimitError::InvalidArgument(_))
        ));
        assert!(matches!(
            limiter.allow("k", 3, Duration::ZERO).await,
            Err(RateLimitError::InvalidArgument(_))
        ));
        assert!(limiter.remaining("", 3).await.is_err());
        assert!(limiter.reset("").await.is_err());
    }

    #[test]
    fn test_post_rate_limit_key_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 41, 12).unwrap();
        assert_eq!(
            post_rate_limit_key("127.0.0.1", now),
            "rate_limit:post:127.0.0.1:2024-03-07-09"
        );
    }

    #[test]
    fn test_default_policy() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.limit, 3);
        assert_eq!(policy.window, Duration::from_secs(3600));
    }
}
