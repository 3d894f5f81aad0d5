//! Store error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store operation '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidArgument("cache key cannot be empty".to_string());
        assert_eq!(err.to_string(), "Invalid argument: cache key cannot be empty");

        let err = StoreError::Timeout {
            operation: "get",
            after: Duration::from_millis(250),
        };
        assert_eq!(
            err.to_string(),
            "Store operation 'get' timed out after 250ms"
        );
    }
}
