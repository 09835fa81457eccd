/// Service banner and health checks
use actix_web::{web, HttpResponse};
use chrono::Utc;
use redis_utils::LazyConnection;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

pub struct HealthState {
    db_pool: PgPool,
    redis: LazyConnection,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Degraded,
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
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    pub fn new(db_pool: PgPool, redis: LazyConnection) -> Self {
        Self { db_pool, redis }
    }

    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_redis(&self) -> Result<(), String> {
        match self.redis.get() {
            Some(manager) => redis_utils::ping(&manager).await.map_err(|e| e.to_string()),
            None => Err("connection not established".to_string()),
        }
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello! The Blog API is up and running!")
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "OK" }))
}

/// Ready when PostgreSQL answers. Redis being down only degrades the
/// service, since every read falls back to the store.
pub async fn readiness_check(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let pg_result = state.check_postgres().await;
    let pg_latency = start.elapsed().as_millis() as u64;
    let ready = pg_result.is_ok();
    checks.insert(
        "postgresql".to_string(),
        match pg_result {
            Ok(_) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "PostgreSQL connection successful".to_string(),
                latency_ms: pg_latency,
            },
            Err(e) => ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms: pg_latency,
            },
        },
    );

    let start = Instant::now();
    let redis_result = state.check_redis().await;
    let redis_latency = start.elapsed().as_millis() as u64;
    let redis_ok = redis_result.is_ok();
    checks.insert(
        "redis".to_string(),
        match redis_result {
            Ok(_) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "Redis ping successful".to_string(),
                latency_ms: redis_latency,
            },
            Err(e) => ComponentCheck {
                status: ComponentStatus::Degraded,
                message: format!("Redis ping failed: {}", e),
                latency_ms: redis_latency,
            },
        },
    );

    let status = overall_status(ready, redis_ok);
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

fn overall_status(postgres_ok: bool, redis_ok: bool) -> ComponentStatus {
    match (postgres_ok, redis_ok) {
        (false, _) => ComponentStatus::Unhealthy,
        (true, false) => ComponentStatus::Degraded,
        (true, true) => ComponentStatus::Healthy,
    }
}
