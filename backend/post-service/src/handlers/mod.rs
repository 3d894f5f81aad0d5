/// HTTP handlers for post-service
///
/// - Posts: create, fetch by id, list by city, keyword search
/// - Health: summary, readiness, liveness
pub mod health;
pub mod posts;

pub use health::{HealthState, PostgresProbe, ReadinessProbe, RedisProbe};
pub use posts::{client_identifier, create_post, get_post, list_posts, search_posts};

use crate::error::AppError;
use actix_web::web;

/// Register every route. Shared data (`PostServices`, `HealthState`) is attached by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and query strings answer like any other validation error
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .route(
        "/metrics",
        web::get().to(crate::metrics::serve_metrics),
    )
    .route("/api/v1/health", web::get().to(health::health_summary))
    .route("/api/v1/health/ready", web::get().to(health::readiness_summary))
    .route("/api/v1/health/live", web::get().to(health::liveness_check))
    .service(
        web::scope("/api/v1/posts")
            .service(
                web::resource("")
                    .route(web::post().to(create_post))
                    .route(web::get().to(list_posts)),
            )
            // Registered before /{post_id} so "search" is not taken as an id
            .service(web::resource("/search").route(web::get().to(search_posts)))
            .service(web::resource("/{post_id}").route(web::get().to(get_post))),
    );
}
