//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use cache_store::{CacheStore, CounterStore, MemoryStore, StoreError, StoreResult};
use post_service::db::{InMemoryPostRepository, PostRepository, RepoError, RepoResult};
use post_service::models::{City, PageRequest, Post, PostId};
use post_service::ratelimit::{CounterRateLimiter, RateLimitError, RateLimiter};
use post_service::services::{CreatePostCommand, PostServices, ServiceSettings};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn unavailable(operation: &'static str) -> StoreError {
    StoreError::Timeout {
        operation,
        after: Duration::from_millis(1),
    }
}

/// Cache whose every call fails
#[derive(Default)]
pub struct FailingCache {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(unavailable("get"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(unavailable("set"))
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(unavailable("del"))
    }

    async fn delete_by_pattern(&self, _pattern: &str) -> StoreResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(unavailable("scan"))
    }
}

/// Counter store whose every call fails
#[derive(Default)]
pub struct FailingCounter;

#[async_trait]
impl CounterStore for FailingCounter {
    async fn incr_with_expiry(&self, _key: &str, _window: Duration) -> StoreResult<i64> {
        Err(unavailable("incr_with_expiry"))
    }

    async fn count(&self, _key: &str) -> StoreResult<Option<i64>> {
        Err(unavailable("get"))
    }

    async fn clear(&self, _key: &str) -> StoreResult<()> {
        Err(unavailable("del"))
    }
}

/// Limiter that records every key it is asked about
pub struct RecordingLimiter {
    inner: CounterRateLimiter,
    pub keys: Mutex<Vec<String>>,
}

impl RecordingLimiter {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self {
            inner: CounterRateLimiter::new(counters),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimiter for RecordingLimiter {
    async fn allow(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError> {
        self.keys.lock().unwrap().push(key.to_string());
        self.inner.allow(key, limit, window).await
    }

    async fn remaining(&self, key: &str, limit: u32) -> Result<u32, RateLimitError> {
        self.inner.remaining(key, limit).await
    }

    async fn reset(&self, key: &str) -> Result<(), RateLimitError> {
        self.inner.reset(key).await
    }
}

/// In-memory repository that counts calls and can be switched to fail
#[derive(Default)]
pub struct CountingRepo {
    pub inner: InMemoryPostRepository,
    pub saves: AtomicUsize,
    pub reads: AtomicUsize,
    pub search_keywords: Mutex<Vec<String>>,
    pub failing: AtomicBool,
}

impl CountingRepo {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for CountingRepo {
    async fn save(&self, post: &Post) -> RepoResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.save(post).await
    }

    async fn find_by_id(&self, id: PostId) -> RepoResult<Post> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_city(&self, city: &City, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_by_city(city, page).await
    }

    async fn find_all(&self, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_all(page).await
    }

    async fn search(
        &self,
        keyword: &str,
        city: Option<&City>,
        page: PageRequest,
    ) -> RepoResult<(Vec<Post>, u64)> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.search_keywords
            .lock()
            .unwrap()
            .push(keyword.to_string());
        self.check()?;
        self.inner.search(keyword, city, page).await
    }
}

/// Services over in-memory stores, with handles to each store for assertions
pub struct Harness {
    pub services: PostServices,
    pub repo: Arc<CountingRepo>,
    pub cache: MemoryStore,
    pub limiter: Arc<RecordingLimiter>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let repo = Arc::new(CountingRepo::default());
        let cache = MemoryStore::new();
        let limiter = Arc::new(RecordingLimiter::new(Arc::new(MemoryStore::new())));
        let services = PostServices::new(
            repo.clone(),
            Arc::new(cache.clone()),
            limiter.clone(),
            settings,
        );
        Self {
            services,
            repo,
            cache,
            limiter,
        }
    }
}

pub fn command(company: &str, city: &str, content: &str, client: &str) -> CreatePostCommand {
    CreatePostCommand {
        company: company.to_string(),
        city_code: city.to_string(),
        city_name: city.to_string(),
        content: content.to_string(),
        client_id: client.to_string(),
    }
}
