use crate::cache::{keys, QueryCache, TtlPolicy};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{CityDirectory, PageRequest, PostPage};
use std::sync::Arc;

/// Listing parameters as received; normalized by the service
#[derive(Debug, Clone, Default)]
pub struct ListPostsQuery {
    pub city: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Newest-first listing for one city or all cities
#[derive(Clone)]
pub struct ListPostsService {
    repo: Arc<dyn PostRepository>,
    cache: QueryCache,
    ttl: TtlPolicy,
    cities: Arc<CityDirectory>,
}

impl ListPostsService {
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
    pub async fn execute(&self, query: ListPostsQuery) -> Result<PostPage> {
        let city_code = query
            .city
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let request = PageRequest::normalize(query.page, query.page_size);
        let key = keys::city_list_key(city_code, request.page);

        if let Some(page) = self.cache.lookup::<PostPage>("list_posts", &key).await.into_hit() {
            return Ok(page);
        }

        let result = match city_code {
            Some(code) => {
                let city = self.cities.resolve(code)?;
                self.repo.find_by_city(&city, request).await
            }
            None => self.repo.find_all(request).await,
        };
        let (posts, total) =
            result.map_err(|e| AppError::store_failure("failed to list posts", e))?;

        let page = PostPage::new(&posts, total, request);
        self.cache
            .populate(&key, &page, self.ttl.city_list(city_code))
            .await;
        Ok(page)
    }
}
