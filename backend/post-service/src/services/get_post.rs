use crate::cache::{keys, QueryCache, TtlPolicy};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{PostId, PostView};
use std::sync::Arc;

/// Single post lookup, cache first
#[derive(Clone)]
pub struct GetPostService {
    repo: Arc<dyn PostRepository>,
    cache: QueryCache,
    ttl: TtlPolicy,
}

impl GetPostService {
    pub fn new(repo: Arc<dyn PostRepository>, cache: QueryCache, ttl: TtlPolicy) -> Self {
        Self { repo, cache, ttl }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, id: &str) -> Result<PostView> {
        let id = PostId::parse(id)?;
        let key = keys::post_key(id);

        if let Some(view) = self.cache.lookup::<PostView>("get_post", &key).await.into_hit() {
            return Ok(view);
        }

        let post = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| AppError::from_repo(e, "failed to load post", format!("post {}", id)))?;

        let view = PostView::from(&post);
        self.cache
            .populate(&key, &view, self.ttl.post_detail())
            .await;
        Ok(view)
    }
}
