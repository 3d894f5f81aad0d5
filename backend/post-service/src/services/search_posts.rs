use crate::cache::{keys, QueryCache, TtlPolicy};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{CityDirectory, PageRequest, PostPage, ValidationError};
use std::sync::Arc;

pub const MIN_KEYWORD_CHARS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct SearchPostsQuery {
    pub keyword: String,
    pub city: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Keyword search, optionally scoped to a city
#[derive(Clone)]
pub struct SearchPostsService {
    repo: Arc<dyn PostRepository>,
    cache: QueryCache,
    ttl: TtlPolicy,
    cities: Arc<CityDirectory>,
}

impl SearchPostsService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: QueryCache,
        ttl: TtlPolicy,
        cities: Arc<CityDirectory>,
    ) -> Self {
        Self {
            repo,
            cache,
            ttl,
            cities,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, query: SearchPostsQuery) -> Result<PostPage> {
        let keyword = query.keyword.trim();
        if keyword.is_empty() {
            return Err(ValidationError::Required { field: "keyword" }.into());
        }
        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            return Err(ValidationError::TooShort {
                field: "keyword",
                min: MIN_KEYWORD_CHARS,
            }
            .into());
        }

        let city_code = query
            .city
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let request = PageRequest::normalize(query.page, query.page_size);
        let key = keys::search_key(keyword, city_code, request.page);

        if let Some(page) = self
            .cache
            .lookup::<PostPage>("search_posts", &key)
            .await
            .into_hit()
        {
            return Ok(page);
        }

        let city = city_code
            .map(|code| self.cities.resolve(code))
            .transpose()?;
        let (posts, total) = self
            .repo
            .search(keyword, city.as_ref(), request)
            .await
            .map_err(|e| AppError::store_failure("failed to search posts", e))?;

        let page = PostPage::new(&posts, total, request);
        self.cache.populate(&key, &page, self.ttl.search()).await;
        Ok(page)
    }
}
