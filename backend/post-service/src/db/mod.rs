/// Relational store access for posts
///
/// `PostRepository` is the contract the query layer depends on. `PgPostRepository`
/// is the PostgreSQL adapter, `InMemoryPostRepository` backs tests and local runs.
mod memory;
mod post_repo;

pub use memory::InMemoryPostRepository;
pub use post_repo::PgPostRepository;

use crate::config::DatabaseConfig;
use crate::models::{City, PageRequest, Post, PostId};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("post not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row no longer satisfies the value-object rules
    #[error("corrupt post row {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Durable post persistence. Every listing is ordered newest first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert, or overwrite the mutable fields of an existing id.
    async fn save(&self, post: &Post) -> RepoResult<()>;

    async fn find_by_id(&self, id: PostId) -> RepoResult<Post>;

    async fn find_by_city(&self, city: &City, page: PageRequest) -> RepoResult<(Vec<Post>, u64)>;

    async fn find_all(&self, page: PageRequest) -> RepoResult<(Vec<Post>, u64)>;

    /// Full-text search over company and content, optionally within one city.
    async fn search(
        &self,
        keyword: &str,
        city: Option<&City>,
        page: PageRequest,
    ) -> RepoResult<(Vec<Post>, u64)>;
}

/// Build the PostgreSQL pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "PostgreSQL pool created"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
