//! Integration handlers: AI, Google Calendar, WhatsApp, OnlyOffice

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pulse_core::traits::Id;
use pulse_integrations::ai::TaskSuggestion;
use pulse_integrations::calendar::CalendarEvent;
use pulse_integrations::onlyoffice::{EditorConfig, EditorPermissions};
use pulse_integrations::SessionState;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

// --- AI ---------------------------------------------------------------

/// POST /api/ai/summarize
pub async fn ai_summarize(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    let ai = state.ai()?;
    let summary = ai.summarize_note(&dto.title, &dto.body).await?;
    Ok(Json(SummarizeResponse { summary }))
}

/// POST /api/ai/suggest-tasks
pub async fn ai_suggest_tasks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<SuggestTasksRequest>,
) -> ApiResult<Json<Vec<TaskSuggestion>>> {
    let ai = state.ai()?;
    Ok(Json(ai.suggest_tasks(&dto.context).await?))
}

/// POST /api/ai/draft-reply
pub async fn ai_draft_reply(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<DraftReplyRequest>,
) -> ApiResult<Json<DraftReplyResponse>> {
    let ai = state.ai()?;
    let draft = ai.draft_reply(&dto.original, &dto.instructions).await?;
    Ok(Json(DraftReplyResponse { draft }))
}

// --- Google Calendar --------------------------------------------------

/// GET /api/calendar/auth-url
pub async fn calendar_auth_url(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<AuthUrlResponse>> {
    let calendar = state.calendar()?;
    let (url, state_token) = calendar.authorize_url();
    Ok(Json(AuthUrlResponse {
        url,
        state: state_token,
    }))
}

/// POST /api/calendar/exchange — turn the callback code into a token
pub async fn calendar_exchange(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<ExchangeRequest>,
) -> ApiResult<Json<ExchangeResponse>> {
    let calendar = state.calendar()?;
    let access_token = calendar.exchange_code(dto.code).await?;
    Ok(Json(ExchangeResponse { access_token }))
}

/// GET /api/calendar/events — the access token travels per request; the
/// server stores no Google credentials
pub async fn calendar_events(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let calendar = state.calendar()?;
    let events = calendar
        .list_events(&query.access_token, query.max_results.unwrap_or(20))
        .await?;
    Ok(Json(events))
}

/// POST /api/calendar/events
pub async fn calendar_create_event(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    let calendar = state.calendar()?;
    let created = calendar
        .insert_event(&dto.access_token, &dto.event)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- WhatsApp ---------------------------------------------------------

/// POST /api/whatsapp/sessions — start (or resume) the caller's session
pub async fn whatsapp_start(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<SessionState>> {
    let manager = state.whatsapp()?;
    Ok(Json(manager.start_session(user.id).await?))
}

/// GET /api/whatsapp/sessions/me — current state (QR included while pending)
pub async fn whatsapp_state(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<SessionState>> {
    let manager = state.whatsapp()?;
    let session_state = manager
        .state(user.id)
        .ok_or_else(|| ApiError::not_found("WhatsAppSession", user.id))?;
    Ok(Json(session_state))
}

/// POST /api/whatsapp/send — requires a Ready session
pub async fn whatsapp_send(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<WaSendRequest>,
) -> ApiResult<StatusCode> {
    let manager = state.whatsapp()?;
    manager.send_text(user.id, &dto.to, &dto.body).await?;
    Ok(StatusCode::ACCEPTED)
}

/// DELETE /api/whatsapp/sessions/me
pub async fn whatsapp_end(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<StatusCode> {
    let manager = state.whatsapp()?;
    manager.end_session(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- OnlyOffice -------------------------------------------------------

/// GET /api/documents/:id/editor-config — signed config for the editor
pub async fn onlyoffice_config(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Query(query): Query<EditorConfigQuery>,
) -> ApiResult<Json<EditorConfig>> {
    let onlyoffice = state.onlyoffice()?;

    let title = query.title;
    let config = onlyoffice
        .editor_config(
            &format!("doc-{}", id),
            &title,
            &query.url,
            user.id,
            &user.login,
            EditorPermissions::default(),
        )
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(config))
}

// --- DTOs -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestTasksRequest {
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftReplyRequest {
    pub original: String,
    pub instructions: String,
}

#[derive(Debug, Serialize)]
pub struct DraftReplyResponse {
    pub draft: String,
}

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub access_token: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub access_token: String,
    pub event: CalendarEvent,
}

#[derive(Debug, Deserialize)]
pub struct WaSendRequest {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct EditorConfigQuery {
    pub title: String,
    pub url: String,
}
