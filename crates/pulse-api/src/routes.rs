//! API routes
//!
//! One nested router per business module, all under `/api`.

use axum::{
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{
    auth, chat, crm, dashboard, emails, finance, hr, integrations, library, notes, portal,
    projects, tasks, users, warehouse,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(users::create))
        .route("/users/me", get(auth::me))
        .route("/dashboard", get(dashboard::snapshot))
        .nest("/users", users_router())
        .nest("/projects", projects_router())
        .nest("/tasks", tasks_router())
        .nest("/notes", notes_router())
        .nest("/chat", chat_router())
        .nest("/email", email_router())
        .nest("/crm", crm_router())
        .nest("/finance", finance_router())
        .nest("/warehouse", warehouse_router())
        .nest("/hr", hr_router())
        .nest("/library", library_router())
        .nest("/portal", portal_router())
        .nest("/ai", ai_router())
        .nest("/calendar", calendar_router())
        .nest("/whatsapp", whatsapp_router())
        .route(
            "/documents/:id/editor-config",
            get(integrations::onlyoffice_config),
        )
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route(
            "/:id",
            get(projects::get)
                .patch(projects::update)
                .delete(projects::delete),
        )
}

fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list).post(tasks::create))
        .route(
            "/:id",
            get(tasks::get).patch(tasks::update).delete(tasks::delete),
        )
        .route("/:id/status", patch(tasks::set_status))
}

fn notes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list).post(notes::create))
        .route(
            "/:id",
            get(notes::get).patch(notes::update).delete(notes::delete),
        )
}

fn chat_router() -> Router<AppState> {
    Router::new()
        .route(
            "/channels",
            get(chat::list_channels).post(chat::create_channel),
        )
        .route(
            "/channels/:id",
            patch(chat::update_channel).delete(chat::delete_channel),
        )
        .route(
            "/channels/:id/messages",
            get(chat::list_messages).post(chat::create_message),
        )
        .route("/messages/:id", delete(chat::delete_message))
}

fn email_router() -> Router<AppState> {
    Router::new()
        .route("/providers", get(emails::providers))
        .route(
            "/accounts",
            get(emails::list_accounts).post(emails::create_account),
        )
        .route("/accounts/:id", delete(emails::delete_account))
        .route("/accounts/:id/sync", post(emails::sync_account))
        .route("/accounts/:id/messages", get(emails::list_messages))
        .route(
            "/messages/:id",
            get(emails::get_message).delete(emails::delete_message),
        )
        .route("/messages/:id/read", patch(emails::set_read))
        .route("/send", post(emails::send))
}

fn crm_router() -> Router<AppState> {
    Router::new()
        .route("/leads", get(crm::list_leads).post(crm::create_lead))
        .route(
            "/leads/:id",
            get(crm::get_lead)
                .patch(crm::update_lead)
                .delete(crm::delete_lead),
        )
        .route("/leads/:id/convert", post(crm::convert_lead))
        .route(
            "/opportunities",
            get(crm::list_opportunities).post(crm::create_opportunity),
        )
        .route(
            "/opportunities/:id",
            patch(crm::update_opportunity).delete(crm::delete_opportunity),
        )
}

fn finance_router() -> Router<AppState> {
    Router::new()
        .route(
            "/invoices",
            get(finance::list_invoices).post(finance::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(finance::get_invoice)
                .patch(finance::update_invoice)
                .delete(finance::delete_invoice),
        )
        .route("/invoices/:id/payments", post(finance::register_payment))
        .route(
            "/quotes",
            get(finance::list_quotes).post(finance::create_quote),
        )
        .route("/quotes/:id", delete(finance::delete_quote))
        .route("/quotes/:id/status", patch(finance::set_quote_status))
        .route("/quotes/:id/accept", post(finance::accept_quote))
}

fn warehouse_router() -> Router<AppState> {
    Router::new()
        .route("/ddt", get(warehouse::list).post(warehouse::create))
        .route(
            "/ddt/:id",
            get(warehouse::get)
                .patch(warehouse::update)
                .delete(warehouse::delete),
        )
}

fn hr_router() -> Router<AppState> {
    Router::new()
        .route(
            "/employees",
            get(hr::list_employees).post(hr::create_employee),
        )
        .route(
            "/employees/:id",
            get(hr::get_employee)
                .patch(hr::update_employee)
                .delete(hr::delete_employee),
        )
        .route("/shifts", get(hr::list_shifts).post(hr::create_shift))
        .route(
            "/shifts/:id",
            patch(hr::update_shift).delete(hr::delete_shift),
        )
        .route("/payslips/parse", post(hr::parse_payslip))
}

fn library_router() -> Router<AppState> {
    Router::new()
        .route("/books", get(library::list_books).post(library::create_book))
        .route(
            "/books/:id",
            get(library::get_book)
                .patch(library::update_book)
                .delete(library::delete_book),
        )
        .route("/books/:id/loans", post(library::create_loan))
        .route("/loans/:id/return", post(library::return_loan))
}

fn portal_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tokens",
            get(portal::list_tokens).post(portal::create_token),
        )
        .route("/tokens/:id", delete(portal::revoke_token))
        .route("/overview", get(portal::overview))
        .route("/invoices", get(portal::invoices))
        .route("/ddt", get(portal::shipments))
}

fn ai_router() -> Router<AppState> {
    Router::new()
        .route("/summarize", post(integrations::ai_summarize))
        .route("/suggest-tasks", post(integrations::ai_suggest_tasks))
        .route("/draft-reply", post(integrations::ai_draft_reply))
}

fn calendar_router() -> Router<AppState> {
    Router::new()
        .route("/auth-url", get(integrations::calendar_auth_url))
        .route("/exchange", post(integrations::calendar_exchange))
        .route(
            "/events",
            get(integrations::calendar_events).post(integrations::calendar_create_event),
        )
}

fn whatsapp_router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(integrations::whatsapp_start))
        .route(
            "/sessions/me",
            get(integrations::whatsapp_state).delete(integrations::whatsapp_end),
        )
        .route("/send", post(integrations::whatsapp_send))
}

async fn api_root() -> Json<ApiRoot> {
    Json(ApiRoot {
        name: "Pulse ERP".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

#[derive(Serialize)]
struct ApiRoot {
    name: String,
    version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use pulse_auth::JwtService;
    use pulse_core::config::AppConfig;
    use pulse_integrations::whatsapp::ScriptedTransport;
    use pulse_integrations::{SessionManager, WaEvent};
    use pulse_mail::LogTransport;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    const TEST_SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    fn test_state(script: Vec<WaEvent>) -> AppState {
        // lazy pool: no database needed for the routes under test
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/pulse_erp_test")
            .expect("lazy pool");

        AppState {
            pool,
            config: Arc::new(AppConfig::default()),
            jwt: Arc::new(JwtService::new(TEST_SECRET)),
            mailer: Arc::new(LogTransport::new()),
            ai: None,
            calendar: None,
            whatsapp: Some(Arc::new(SessionManager::new(Arc::new(
                ScriptedTransport::new(script),
            )))),
            onlyoffice: None,
        }
    }

    fn app(script: Vec<WaEvent>) -> Router {
        router().with_state(test_state(script))
    }

    fn bearer(admin: bool) -> String {
        let token = JwtService::new(TEST_SECRET)
            .create_token(1, Some("mrossi".into()), admin, 3600)
            .unwrap();
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn test_api_root_is_public() {
        let response = app(vec![])
            .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tasks_require_authentication() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .uri("/api/tasks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .uri("/api/tasks")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_portal_endpoints_require_portal_token() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .uri("/api/portal/invoices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_minting_is_admin_only() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/portal/tokens")
                    .header(header::AUTHORIZATION, bearer(false))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"customerName\":\"ACME Srl\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ai_unconfigured_returns_service_unavailable() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ai/summarize")
                    .header(header::AUTHORIZATION, bearer(false))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"title\":\"t\",\"body\":\"b\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_email_providers_catalog() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .uri("/api/email/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_whatsapp_session_lifecycle() {
        let app = app(vec![
            WaEvent::Qr("qr-payload".into()),
            WaEvent::Authenticated,
            WaEvent::Ready,
        ]);

        // start the session
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/whatsapp/sessions")
                    .header(header::AUTHORIZATION, bearer(false))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // the scripted events settle quickly; poll state until ready
        let mut ready = false;
        for _ in 0..50 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/whatsapp/sessions/me")
                        .header(header::AUTHORIZATION, bearer(false))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            if bytes.as_ref() == b"{\"state\":\"ready\"}" {
                ready = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(ready, "session never reached ready");

        // sending is allowed once ready
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/whatsapp/send")
                    .header(header::AUTHORIZATION, bearer(false))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"to\":\"+391234567890\",\"body\":\"ciao\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_whatsapp_send_before_ready_conflicts() {
        // no events: the session stays in Initializing
        let app = app(vec![]);

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/whatsapp/sessions")
                    .header(header::AUTHORIZATION, bearer(false))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/whatsapp/send")
                    .header(header::AUTHORIZATION, bearer(false))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"to\":\"+391234567890\",\"body\":\"ciao\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
