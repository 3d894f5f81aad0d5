use super::{PostRepository, RepoError, RepoResult};
use crate::models::{City, CompanyName, Content, PageRequest, Post, PostId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    company_name: String,
    city_code: String,
    city_name: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = RepoError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::models::ValidationError| RepoError::Corrupt {
            id: row.id,
            reason: e.to_string(),
        };
        let company = CompanyName::new(&row.company_name).map_err(corrupt)?;
        let city = City::new(&row.city_code, &row.city_name).map_err(corrupt)?;
        let content = Content::new(&row.content).map_err(corrupt)?;
        Ok(Post::restore(
            PostId::from(row.id),
            company,
            city,
            content,
            row.created_at,
        ))
    }
}

fn into_posts(rows: Vec<PostRow>) -> RepoResult<Vec<Post>> {
    rows.into_iter().map(Post::try_from).collect()
}

fn into_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn save(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, company_name, city_code, city_name, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                city_code = EXCLUDED.city_code,
                city_name = EXCLUDED.city_name,
                content = EXCLUDED.content,
                updated_at = NOW()
            "#,
        )
        .bind(post.id().as_uuid())
        .bind(post.company().as_str())
        .bind(post.city().code())
        .bind(post.city().name())
        .bind(post.content().as_str())
        .bind(post.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> RepoResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, company_name, city_code, city_name, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepoError::NotFound)?.try_into()
    }

    async fn find_by_city(&self, city: &City, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, company_name, city_code, city_name, content, created_at
            FROM posts
            WHERE city_code = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(city.code())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE city_code = $1")
            .bind(city.code())
            .fetch_one(&self.pool)
            .await?;

        Ok((into_posts(rows)?, into_total(count)))
    }

    async fn find_all(&self, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, company_name, city_code, city_name, content, created_at
            FROM posts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok((into_posts(rows)?, into_total(count)))
    }

    async fn search(
        &self,
        keyword: &str,
        city: Option<&City>,
        page: PageRequest,
    ) -> RepoResult<(Vec<Post>, u64)> {
        let (rows, count) = match city {
            Some(city) => {
                let rows = sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, company_name, city_code, city_name, content, created_at
                    FROM posts
                    WHERE city_code = $1
                      AND to_tsvector('simple', company_name || ' ' || content)
                          @@ plainto_tsquery('simple', $2)
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(city.code())
                .bind(keyword)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

                let (count,): (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*)
                    FROM posts
                    WHERE city_code = $1
                      AND to_tsvector('simple', company_name || ' ' || content)
                          @@ plainto_tsquery('simple', $2)
                    "#,
                )
                .bind(city.code())
                .bind(keyword)
                .fetch_one(&self.pool)
                .await?;

                (rows, count)
            }
            None => {
                let rows = sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, company_name, city_code, city_name, content, created_at
                    FROM posts
                    WHERE to_tsvector('simple', company_name || ' ' || content)
                          @@ plainto_tsquery('simple', $1)
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(keyword)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

                let (count,): (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*)
                    FROM posts
                    WHERE to_tsvector('simple', company_name || ' ' || content)
                          @@ plainto_tsquery('simple', $1)
                    "#,
                )
                .bind(keyword)
                .fetch_one(&self.pool)
                .await?;

                (rows, count)
            }
        };

        Ok((into_posts(rows)?, into_total(count)))
    }
}
