//! Application state and request extractors

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use pulse_auth::{extract_bearer_token, CurrentUser, JwtService};
use pulse_core::config::AppConfig;
use pulse_core::pagination::Pagination;
use pulse_db::portal::PortalRepository;
use pulse_integrations::{AiService, GoogleCalendarService, OnlyOfficeService, SessionManager};
use pulse_mail::MailTransport;
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::ApiError;

/// Shared application state; cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtService>,
    pub mailer: Arc<dyn MailTransport>,
    pub ai: Option<Arc<AiService>>,
    pub calendar: Option<Arc<GoogleCalendarService>>,
    pub whatsapp: Option<Arc<SessionManager>>,
    pub onlyoffice: Option<Arc<OnlyOfficeService>>,
}

impl AppState {
    pub fn ai(&self) -> Result<&Arc<AiService>, ApiError> {
        self.ai.as_ref().ok_or(ApiError::NotConfigured("AI"))
    }

    pub fn calendar(&self) -> Result<&Arc<GoogleCalendarService>, ApiError> {
        self.calendar
            .as_ref()
            .ok_or(ApiError::NotConfigured("Google Calendar"))
    }

    pub fn whatsapp(&self) -> Result<&Arc<SessionManager>, ApiError> {
        self.whatsapp
            .as_ref()
            .ok_or(ApiError::NotConfigured("WhatsApp"))
    }

    pub fn onlyoffice(&self) -> Result<&Arc<OnlyOfficeService>, ApiError> {
        self.onlyoffice
            .as_ref()
            .ok_or(ApiError::NotConfigured("OnlyOffice"))
    }
}

/// Authenticated user extractor (Bearer JWT)
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Bearer token required"))?;

        let claims = app_state
            .jwt
            .validate_token(token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Malformed token subject"))?;

        Ok(AuthenticatedUser(CurrentUser::new(
            user_id,
            claims.login.unwrap_or_default(),
            claims.admin,
        )))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Admin-only extractor layered over `AuthenticatedUser`
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Administrator access required"));
        }
        Ok(AdminUser(user))
    }
}

impl std::ops::Deref for AdminUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Portal customer extractor (`X-Portal-Token` header)
pub struct PortalCustomer {
    pub customer_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for PortalCustomer
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(pulse_auth::portal::PORTAL_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Portal token required"))?;

        let repo = PortalRepository::new(app_state.pool.clone());
        let record = repo
            .find_by_token(token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("Unknown portal token"))?;

        if !record.is_valid(chrono::Utc::now()) {
            return Err(ApiError::unauthorized("Portal token expired or revoked"));
        }

        Ok(PortalCustomer {
            customer_name: record.customer_name,
        })
    }
}

/// Pagination extractor with defaults
pub struct Page(pub Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pagination) = Query::<Pagination>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(Pagination::default()));
        Ok(Page(Pagination::new(pagination.page_size, pagination.offset)))
    }
}

impl std::ops::Deref for Page {
    type Target = Pagination;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
