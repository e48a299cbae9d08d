//! Health check system
//!
//! Component checks (database ping, memory, disk) with a short cache so
//! the monitor page can poll without hammering the pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::debug;

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub check_timeout: Duration,
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    pool: Option<PgPool>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedHealth {
                report: report.clone(),
                cached_at: Instant::now(),
            });
        }

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let mut components = Vec::new();
        let mut overall = HealthStatus::Healthy;

        if self.pool.is_some() {
            let db_health = self.check_database().await;
            if db_health.status == HealthStatus::Unhealthy {
                overall = HealthStatus::Unhealthy;
            }
            components.push(db_health);
        }

        HealthReport {
            status: overall,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();
        let pool = self.pool.as_ref().expect("checked by caller");

        let ping = tokio::time::timeout(
            self.config.check_timeout,
            sqlx::query("SELECT 1").execute(pool),
        )
        .await;

        let (status, message) = match ping {
            Ok(Ok(_)) => (HealthStatus::Healthy, Some("Connected".to_string())),
            Ok(Err(e)) => (HealthStatus::Unhealthy, Some(e.to_string())),
            Err(_) => (HealthStatus::Unhealthy, Some("Ping timed out".to_string())),
        };

        ComponentHealth {
            name: "database",
            status,
            message,
            response_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// State shared with the health routes
pub struct ServerState {
    pub health: Arc<HealthChecker>,
}

/// Simple liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check (components included)
pub async fn readiness(State(state): State<Arc<ServerState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    let status = report.http_status();
    (status, Json(report))
}

/// Full health report
pub async fn health(State(state): State<Arc<ServerState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    let status = report.http_status();
    (status, Json(report))
}

/// Plain OK for load balancers
pub async fn default_health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_without_pool_is_healthy() {
        let checker = HealthChecker::new(HealthConfig::default());
        let report = checker.check().await;

        assert!(report.status.is_healthy());
        assert!(report.components.is_empty());
    }

    #[tokio::test]
    async fn test_health_cache() {
        let checker = HealthChecker::new(HealthConfig {
            cache_duration: Duration::from_secs(60),
            ..Default::default()
        });

        let report1 = checker.check().await;
        let report2 = checker.check().await;

        assert_eq!(report1.timestamp, report2.timestamp);
    }

    #[test]
    fn test_http_status_mapping() {
        let report = HealthReport {
            status: HealthStatus::Unhealthy,
            version: "1.0".into(),
            uptime_seconds: 1,
            components: vec![],
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(report.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
