/// Domain models for post-service
///
/// - Value objects (`PostId`, `CompanyName`, `Content`, `City`) validate on construction
/// - `Post` is the aggregate persisted by the relational store
/// - `PostView` / `PostPage` are the cached and wire shapes
mod city;
mod dto;
mod post;

pub use city::{City, CityDirectory, CITY_CODE_MAX_CHARS, CITY_NAME_MAX_CHARS};
pub use dto::{PageRequest, PostPage, PostView, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use post::{
    CompanyName, Content, Post, PostId, COMPANY_NAME_MAX_CHARS, CONTENT_MAX_CHARS,
    CONTENT_MIN_CHARS, SUMMARY_CHARS,
};

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid post id: {0}")]
    InvalidPostId(String),
}
