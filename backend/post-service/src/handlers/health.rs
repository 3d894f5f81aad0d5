/// Health endpoints
///
/// `/health` and `/health/live` only report that the process is serving.
/// `/health/ready` probes each backing store and returns 503 if any is down.
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use cache_store::RedisStore;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// A dependency that can be pinged for readiness
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), String>;
}

pub struct PostgresProbe(pub PgPool);

#[async_trait]
impl ReadinessProbe for PostgresProbe {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    async fn check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.0)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

pub struct RedisProbe(pub RedisStore);

#[async_trait]
impl ReadinessProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> Result<(), String> {
        self.0.ping().await.map_err(|e| e.to_string())
    }
}

#[derive(Clone, Default)]
pub struct HealthState {
    probes: Vec<Arc<dyn ReadinessProbe>>,
}

impl HealthState {
    pub fn new(probes: Vec<Arc<dyn ReadinessProbe>>) -> Self {
        Self { probes }
    }
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<&'static str, ComponentCheck>,
    timestamp: String,
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "post-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

pub async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    for probe in &state.probes {
        let start = Instant::now();
        let result = probe.check().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let check = match result {
            Ok(()) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: format!("{} reachable", probe.name()),
                latency_ms,
            },
            Err(e) => {
                ready = false;
                tracing::warn!(component = probe.name(), error = %e, "Readiness probe failed");
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: format!("{} check failed: {}", probe.name(), e),
                    latency_ms,
                }
            }
        };
        checks.insert(probe.name(), check);
    }

    let status = if ready {
        ComponentStatus::Healthy
    } else {
        ComponentStatus::Unhealthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
