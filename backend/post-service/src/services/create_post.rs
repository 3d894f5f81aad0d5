use crate::cache::{InvalidationScope, QueryCache};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{City, CompanyName, Content, Post, PostView, ValidationError};
use crate::ratelimit::{post_rate_limit_key, RateLimitPolicy, RateLimiter};
use chrono::Utc;
use std::sync::Arc;

/// Input for a new post. `client_id` identifies the caller for throttling.
#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub company: String,
    pub city_code: String,
    pub city_name: String,
    pub content: String,
    pub client_id: String,
}

impl CreatePostCommand {
    fn ensure_required(&self) -> std::result::Result<(), ValidationError> {
        let fields = [
            ("company name", &self.company),
            ("city code", &self.city_code),
            ("city name", &self.city_name),
            ("content", &self.content),
            ("client identifier", &self.client_id),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::Required { field });
            }
        }
        Ok(())
    }
}

/// Rate-limited post creation with list invalidation
#[derive(Clone)]
pub struct CreatePostService {
    repo: Arc<dyn PostRepository>,
    cache: QueryCache,
    limiter: Arc<dyn RateLimiter>,
    policy: RateLimitPolicy,
    scope: InvalidationScope,
}

impl CreatePostService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: QueryCache,
        limiter: Arc<dyn RateLimiter>,
        policy: RateLimitPolicy,
        scope: InvalidationScope,
    ) -> Self {
        Self {
            repo,
            cache,
            limiter,
            policy,
            scope,
        }
    }

    #[tracing::instrument(skip(self, cmd), fields(city = %cmd.city_code, client = %cmd.client_id))]
    pub async fn execute(&self, cmd: CreatePostCommand) -> Result<PostView> {
        cmd.ensure_required()?;
        let company = CompanyName::new(&cmd.company)?;
        let city = City::new(&cmd.city_code, &cmd.city_name)?;
        let content = Content::new(&cmd.content)?;

        // Fail closed: a limiter outage blocks the write
        let key = post_rate_limit_key(cmd.client_id.trim(), Utc::now());
        let allowed = match self
            .limiter
            .allow(&key, self.policy.limit, self.policy.window)
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                metrics::record_rate_limit_decision("error");
                return Err(e.into());
            }
        };
        if !allowed {
            metrics::record_rate_limit_decision("denied");
            return Err(AppError::RateLimited(format!(
                "maximum {} posts per {} minutes",
                self.policy.limit,
                self.policy.window.as_secs() / 60
            )));
        }
        metrics::record_rate_limit_decision("allowed");

        let post = Post::new(company, city, content);
        self.repo
            .save(&post)
            .await
            .map_err(|e| AppError::store_failure("failed to save post", e))?;

        self.cache
            .invalidate(&self.scope.patterns(post.city().code()))
            .await;

        tracing::info!(post_id = %post.id(), "Post created");
        Ok(PostView::from(&post))
    }
}
