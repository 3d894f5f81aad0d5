/// Query orchestrators
///
/// Each use case composes the relational store with the query cache; creation also
/// goes through the rate limiter. They hold no mutable state of their own.
mod create_post;
mod get_post;
mod list_posts;
mod search_posts;

pub use create_post::{CreatePostCommand, CreatePostService};
pub use get_post::GetPostService;
pub use list_posts::{ListPostsQuery, ListPostsService};
pub use search_posts::{SearchPostsQuery, SearchPostsService, MIN_KEYWORD_CHARS};

use crate::cache::{InvalidationScope, QueryCache, TtlPolicy};
use crate::db::PostRepository;
use crate::models::CityDirectory;
use crate::ratelimit::{RateLimitPolicy, RateLimiter};
use cache_store::CacheStore;
use std::sync::Arc;

/// Tunables shared by the orchestrators
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub rate_limit: RateLimitPolicy,
    pub ttl: TtlPolicy,
    pub invalidation: InvalidationScope,
    pub cities: CityDirectory,
}

/// All four orchestrators wired to the same stores
#[derive(Clone)]
pub struct PostServices {
    create: CreatePostService,
    get: GetPostService,
    list: ListPostsService,
    search: SearchPostsService,
    cities: Arc<CityDirectory>,
}

impl PostServices {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: Arc<dyn CacheStore>,
        limiter: Arc<dyn RateLimiter>,
        settings: ServiceSettings,
    ) -> Self {
        let cache = QueryCache::new(cache);
        let cities = Arc::new(settings.cities);

        Self {
            create: CreatePostService::new(
                repo.clone(),
                cache.clone(),
                limiter,
                settings.rate_limit,
                settings.invalidation,
            ),
            get: GetPostService::new(repo.clone(), cache.clone(), settings.ttl.clone()),
            list: ListPostsService::new(
                repo.clone(),
                cache.clone(),
                settings.ttl.clone(),
                cities.clone(),
            ),
            search: SearchPostsService::new(repo, cache, settings.ttl, cities.clone()),
            cities,
        }
    }

    pub fn create(&self) -> &CreatePostService {
        &self.create
    }

    pub fn get(&self) -> &GetPostService {
        &self.get
    }

    pub fn list(&self) -> &ListPostsService {
        &self.list
    }

    pub fn search(&self) -> &SearchPostsService {
        &self.search
    }

    pub fn cities(&self) -> &CityDirectory {
        &self.cities
    }
}
