//! Metrics and observability
//!
//! Atomic counters exported in Prometheus text format and as JSON for the
//! monitor dashboard. Requests are counted by a middleware layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Metrics collector
pub struct Metrics {
    pub http_requests_total: AtomicU64,
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    pub http_request_duration_ms_total: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_request_duration_ms_total: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self, status: StatusCode, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);

        let code = status.as_u16();
        if (200..300).contains(&code) {
            self.http_requests_2xx.fetch_add(1, Ordering::Relaxed);
        } else if (400..500).contains(&code) {
            self.http_requests_4xx.fetch_add(1, Ordering::Relaxed);
        } else if code >= 500 {
            self.http_requests_5xx.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("# HELP pulse_http_requests_total Total HTTP requests\n");
        out.push_str("# TYPE pulse_http_requests_total counter\n");
        out.push_str(&format!(
            "pulse_http_requests_total {}\n",
            self.http_requests_total.load(Ordering::Relaxed)
        ));

        out.push_str("# TYPE pulse_http_requests_by_class counter\n");
        out.push_str(&format!(
            "pulse_http_requests_by_class{{class=\"2xx\"}} {}\n",
            self.http_requests_2xx.load(Ordering::Relaxed)
        ));
        out.push_str(&format!(
            "pulse_http_requests_by_class{{class=\"4xx\"}} {}\n",
            self.http_requests_4xx.load(Ordering::Relaxed)
        ));
        out.push_str(&format!(
            "pulse_http_requests_by_class{{class=\"5xx\"}} {}\n",
            self.http_requests_5xx.load(Ordering::Relaxed)
        ));

        out.push_str("# TYPE pulse_http_request_duration_ms_total counter\n");
        out.push_str(&format!(
            "pulse_http_request_duration_ms_total {}\n",
            self.http_request_duration_ms_total.load(Ordering::Relaxed)
        ));

        out.push_str("# TYPE pulse_uptime_seconds gauge\n");
        out.push_str(&format!("pulse_uptime_seconds {}\n", self.uptime_seconds()));

        out
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            http_requests_total: self.http_requests_total.load(Ordering::Relaxed),
            http_requests_2xx: self.http_requests_2xx.load(Ordering::Relaxed),
            http_requests_4xx: self.http_requests_4xx.load(Ordering::Relaxed),
            http_requests_5xx: self.http_requests_5xx.load(Ordering::Relaxed),
            http_request_duration_ms_total: self
                .http_request_duration_ms_total
                .load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub http_requests_total: u64,
    pub http_requests_2xx: u64,
    pub http_requests_4xx: u64,
    pub http_requests_5xx: u64,
    pub http_request_duration_ms_total: u64,
    pub uptime_seconds: u64,
}

/// Count every request and its duration
pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record_request(response.status(), start.elapsed().as_millis() as u64);
    response
}

/// GET /metrics
pub async fn prometheus_metrics(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        metrics.to_prometheus(),
    )
}

/// GET /metrics.json
pub async fn json_metrics(State(metrics): State<Arc<Metrics>>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_classifies_status() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::OK, 12);
        metrics.record_request(StatusCode::NOT_FOUND, 3);
        metrics.record_request(StatusCode::INTERNAL_SERVER_ERROR, 8);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.http_requests_total, 3);
        assert_eq!(snapshot.http_requests_2xx, 1);
        assert_eq!(snapshot.http_requests_4xx, 1);
        assert_eq!(snapshot.http_requests_5xx, 1);
        assert_eq!(snapshot.http_request_duration_ms_total, 23);
    }

    #[test]
    fn test_prometheus_export_contains_counters() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::OK, 5);

        let text = metrics.to_prometheus();
        assert!(text.contains("pulse_http_requests_total 1"));
        assert!(text.contains("pulse_http_requests_by_class{class=\"2xx\"} 1"));
        assert!(text.contains("pulse_uptime_seconds"));
    }
}
