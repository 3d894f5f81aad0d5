//! Prometheus metrics for post-service.
//!
//! Exposes cache and rate-limit collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Cache probes by query (get_post/list_posts/search_posts) and outcome (hit/miss/error/corrupt).
    pub static ref CACHE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_cache_lookups_total",
        "Cache lookups segmented by query and outcome",
        &["query", "outcome"]
    )
    .expect("failed to register post_cache_lookups_total");

    /// Swallowed cache write failures (populate/invalidate).
    pub static ref CACHE_BEST_EFFORT_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_cache_best_effort_failures_total",
        "Best-effort cache operations that failed and were swallowed",
        &["operation"]
    )
    .expect("failed to register post_cache_best_effort_failures_total");

    /// Rate limiter decisions (allowed/denied/error).
    pub static ref RATE_LIMIT_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_rate_limit_decisions_total",
        "Post creation rate limit decisions",
        &["decision"]
    )
    .expect("failed to register post_rate_limit_decisions_total");
}

pub fn record_cache_lookup(query: &str, outcome: &str) {
    CACHE_LOOKUPS_TOTAL
        .with_label_values(&[query, outcome])
        .inc();
}

pub fn record_best_effort_failure(operation: &str) {
    CACHE_BEST_EFFORT_FAILURES_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn record_rate_limit_decision(decision: &str) {
    RATE_LIMIT_DECISIONS_TOTAL
        .with_label_values(&[decision])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
