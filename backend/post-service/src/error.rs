/// Error types for Post Service
///
/// Every orchestrator returns [`AppError`]. Validation, not-found and rate-limit
/// conditions map one-to-one onto client responses; store failures keep their
/// cause for logging but render as an opaque 500. Cache problems never reach
/// this type.
use crate::db::RepoError;
use crate::models::ValidationError;
use crate::ratelimit::RateLimitError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Relational or counter store unreachable or erroring
    #[error("Store failure: {context}: {source}")]
    StoreFailure {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn store_failure(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        AppError::StoreFailure {
            context,
            source: source.into(),
        }
    }

    /// Translate a repository failure; `NotFound` stays a client-facing condition.
    pub fn from_repo(err: RepoError, context: &'static str, what: impl Into<String>) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound(what.into()),
            other => AppError::store_failure(context, other),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        AppError::store_failure("rate limit check failed", err)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = match self {
            AppError::StoreFailure { context, source } => {
                tracing::error!(context, error = %source, "Store failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::store_failure("db", anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_failure_body_hides_cause() {
        let err = AppError::store_failure("db", anyhow::anyhow!("password=hunter2"));
        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("internal server error"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_repo_not_found_is_not_a_store_failure() {
        assert!(matches!(
            AppError::from_repo(RepoError::NotFound, "db", "post"),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from_repo(
                RepoError::Database(sqlx::Error::PoolTimedOut),
                "db",
                "post"
            ),
            AppError::StoreFailure { .. }
        ));
    }

    #[test]
    fn test_limiter_failure_maps_to_store_failure() {
        let err: AppError = RateLimitError::Store(cache_store::StoreError::Timeout {
            operation: "incr_with_expiry",
            after: std::time::Duration::from_millis(500),
        })
        .into();
        assert!(matches!(err, AppError::StoreFailure { .. }));
    }
}
