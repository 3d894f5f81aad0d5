use super::Post;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Flattened post, used both as the response body and the cached payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostView {
    pub id: Uuid,
    pub company: String,
    pub city_code: String,
    pub city_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id().as_uuid(),
            company: post.company().as_str().to_string(),
            city_code: post.city().code().to_string(),
            city_name: post.city().name().to_string(),
            content: post.content().as_str().to_string(),
            created_at: post.created_at(),
        }
    }
}

/// One page of posts. `total` counts every match, not just this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl PostPage {
    pub fn new(posts: &[Post], total: u64, request: PageRequest) -> Self {
        Self {
            posts: posts.iter().map(PostView::from).collect(),
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }
}

/// 1-based page coordinates, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Missing or non-positive values fall back to page 1 / size 20.
    pub fn normalize(page: Option<i64>, page_size: Option<i64>) -> Self {
        let positive = |v: Option<i64>, default: u32| {
            v.filter(|v| *v > 0)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default)
        };
        Self {
            page: positive(page, DEFAULT_PAGE),
            page_size: positive(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, CompanyName, Content};

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::normalize(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::normalize(Some(0), Some(-5)),
            PageRequest {
                page: 1,
                page_size: 20
            }
        );
        let request = PageRequest::normalize(Some(3), Some(10));
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_page_request_overflow_falls_back() {
        let request = PageRequest::normalize(Some(i64::MAX), None);
        assert_eq!(request.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_post_view_from_post() {
        let post = Post::new(
            CompanyName::new("Acme").unwrap(),
            City::new("beijing", "北京").unwrap(),
            Content::new("overtime every single day").unwrap(),
        );
        let view = PostView::from(&post);
        assert_eq!(view.id, post.id().as_uuid());
        assert_eq!(view.city_name, "北京");
        assert_eq!(view.created_at, post.created_at());
    }

    #[test]
    fn test_cached_page_rejects_unknown_fields() {
        let raw = r#"{"posts":[],"total":0,"page":1,"page_size":20,"extra":true}"#;
        assert!(serde_json::from_str::<PostPage>(raw).is_err());

        let missing = r#"{"posts":[],"total":0,"page":1}"#;
        assert!(serde_json::from_str::<PostPage>(missing).is_err());
    }
}
