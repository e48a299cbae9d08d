//! Pulse ERP Server
//!
//! HTTP server binary: loads configuration, connects the pool, assembles
//! the application state and serves the API with health and metrics
//! endpoints.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_api::extractors::AppState;
use pulse_auth::JwtService;
use pulse_core::config::{AppConfig, MailDeliveryMethod};
use pulse_db::{Database, DatabaseConfig};
use pulse_integrations::whatsapp::BridgeTransport;
use pulse_integrations::{AiService, GoogleCalendarService, OnlyOfficeService, SessionManager};
use pulse_mail::{LogTransport, MailTransport, TestTransport};

mod health;
mod metrics;

use health::{HealthChecker, HealthConfig, ServerState};
use metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from env: {}, using defaults", e);
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Pulse ERP"
    );

    let db_config = DatabaseConfig::with_url(&config.database.url);
    let db = Database::connect(&db_config).await?;
    info!("Connected to database");

    let app_state = build_app_state(&config, &db);

    let metrics = Arc::new(Metrics::new());
    let health_checker = Arc::new(
        HealthChecker::new(HealthConfig::default()).with_pool(db.pool().clone()),
    );
    let server_state = Arc::new(ServerState {
        health: health_checker,
    });

    let app = build_router(app_state, server_state, metrics);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse_server=debug,pulse_api=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Assemble the API state from config; integrations stay `None` when their
/// settings are absent and the matching endpoints answer 503.
fn build_app_state(config: &AppConfig, db: &Database) -> AppState {
    // SMTP wire delivery runs out of process; in-process delivery logs
    let mailer: Arc<dyn MailTransport> = match config.mail.delivery_method {
        MailDeliveryMethod::Test => Arc::new(TestTransport::new()),
        MailDeliveryMethod::Smtp => Arc::new(LogTransport::new()),
    };

    let ai = config.integrations.openai.as_ref().and_then(|openai| {
        match AiService::new(openai.clone()) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("AI integration disabled: {}", e);
                None
            }
        }
    });

    let calendar = config.integrations.google.as_ref().and_then(|google| {
        match GoogleCalendarService::new(google) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("Calendar integration disabled: {}", e);
                None
            }
        }
    });

    let whatsapp = config.integrations.whatsapp.as_ref().and_then(|wa| {
        match BridgeTransport::new(wa) {
            Ok(transport) => Some(Arc::new(SessionManager::new(Arc::new(transport)))),
            Err(e) => {
                warn!("WhatsApp integration disabled: {}", e);
                None
            }
        }
    });

    let onlyoffice = config
        .integrations
        .onlyoffice
        .as_ref()
        .map(|oo| Arc::new(OnlyOfficeService::new(oo.clone())));

    AppState {
        pool: db.pool().clone(),
        config: Arc::new(config.clone()),
        jwt: Arc::new(JwtService::new(config.auth.jwt_secret.as_bytes())),
        mailer,
        ai,
        calendar,
        whatsapp,
        onlyoffice,
    }
}

/// Build the application router
fn build_router(
    app_state: AppState,
    server_state: Arc<ServerState>,
    metrics: Arc<Metrics>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::default_health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health/full", get(health::health))
        .with_state(server_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/metrics.json", get(metrics::json_metrics))
        .with_state(metrics.clone());

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(pulse_api::router().with_state(app_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(middleware::from_fn_with_state(
            metrics,
            metrics::metrics_middleware,
        ))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let app_state = AppState {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes")),
            mailer: Arc::new(TestTransport::new()),
            ai: None,
            calendar: None,
            whatsapp: None,
            onlyoffice: None,
        };

        let metrics = Arc::new(Metrics::new());
        let server_state = Arc::new(ServerState {
            health: Arc::new(HealthChecker::new(HealthConfig::default())),
        });

        build_router(app_state, server_state, metrics)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_root() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
