/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::services::{CreatePostCommand, ListPostsQuery, PostServices, SearchPostsQuery};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub company: String,
    pub city_code: String,
    /// Looked up from the city directory when omitted
    pub city_name: Option<String>,
    pub content: String,
}

/// Paging values are parsed leniently; anything unusable falls back to defaults.
#[derive(Debug, Deserialize)]
pub struct ListPostsParams {
    pub city: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchPostsParams {
    #[serde(default)]
    pub keyword: String,
    pub city: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<String>,
}

fn lenient(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// Caller identity for throttling: first `X-Forwarded-For` hop, then `X-Real-IP`,
/// then the peer address.
pub fn client_identifier(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(forwarded) = header("X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|v| !v.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header("X-Real-IP") {
        return real_ip;
    }
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Create a new post
pub async fn create_post(
    services: web::Data<PostServices>,
    req: HttpRequest,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let city_name = match body.city_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => services.cities().name_for(body.city_code.trim()),
    };

    let cmd = CreatePostCommand {
        company: body.company,
        city_code: body.city_code,
        city_name,
        content: body.content,
        client_id: client_identifier(&req),
    };

    let post = services.create().execute(cmd).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(
    services: web::Data<PostServices>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = services.get().execute(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// List posts, optionally for one city
pub async fn list_posts(
    services: web::Data<PostServices>,
    params: web::Query<ListPostsParams>,
) -> Result<HttpResponse> {
    let query = ListPostsQuery {
        city: params.city.clone(),
        page: lenient(&params.page),
        page_size: lenient(&params.page_size),
    };

    let page = services.list().execute(query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Search posts by keyword
pub async fn search_posts(
    services: web::Data<PostServices>,
    params: web::Query<SearchPostsParams>,
) -> Result<HttpResponse> {
    let query = SearchPostsQuery {
        keyword: params.keyword.clone(),
        city: params.city.clone(),
        page: lenient(&params.page),
        page_size: lenient(&params.page_size),
    };

    let page = services.search().execute(query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_client_identifier_prefers_forwarded_for() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1"))
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_identifier(&req), "203.0.113.7");
    }

    #[test]
    fn test_client_identifier_falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_identifier(&req), "198.51.100.2");
    }

    #[test]
    fn test_client_identifier_peer_address() {
        let req = TestRequest::default()
            .peer_addr("127.0.0.1:54321".parse().unwrap())
            .to_http_request();
        assert_eq!(client_identifier(&req), "127.0.0.1");
    }

    #[test]
    fn test_lenient_paging() {
        assert_eq!(lenient(&Some("3".to_string())), Some(3));
        assert_eq!(lenient(&Some("abc".to_string())), None);
        assert_eq!(lenient(&None), None);
    }
}
