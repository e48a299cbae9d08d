//! Email handlers: accounts, stored messages, composing

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::emails::{CreateEmailAccount, EmailRepository, StoreEmailMessage};
use pulse_mail::{preset_endpoints, MailAddress, MailTransport, OutgoingMail};
use pulse_models::email::{EmailAccount, EmailMessage, MailProvider};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/email/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<EmailAccount>>> {
    let repo = EmailRepository::new(state.pool.clone());
    Ok(Json(repo.list_accounts(user.id).await?))
}

/// POST /api/email/accounts
///
/// A provider preset fills the IMAP/SMTP endpoints; `custom` requires all
/// four fields in the request.
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<EmailAccount>)> {
    dto.validate()?;

    let (imap_host, imap_port, smtp_host, smtp_port) = match preset_endpoints(dto.provider) {
        Some(preset) => (
            preset.imap_host.to_string(),
            preset.imap_port,
            preset.smtp_host.to_string(),
            preset.smtp_port,
        ),
        None => {
            let mut errors = pulse_core::error::ValidationErrors::new();
            if dto.imap_host.is_none() {
                errors.add("imapHost", "is required for custom providers");
            }
            if dto.smtp_host.is_none() {
                errors.add("smtpHost", "is required for custom providers");
            }
            if !errors.is_empty() {
                return Err(ApiError::Validation(errors));
            }
            (
                dto.imap_host.unwrap_or_default(),
                dto.imap_port.unwrap_or(993),
                dto.smtp_host.unwrap_or_default(),
                dto.smtp_port.unwrap_or(465),
            )
        }
    };

    let repo = EmailRepository::new(state.pool.clone());
    let account = repo
        .create_account(CreateEmailAccount {
            user_id: user.id,
            address: dto.address,
            display_name: dto.display_name,
            provider: dto.provider,
            imap_host,
            imap_port,
            smtp_host,
            smtp_port,
            credential_ref: dto.credential_ref,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// DELETE /api/email/accounts/:id
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = EmailRepository::new(state.pool.clone());
    repo.delete_account(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/email/accounts/:id/sync
///
/// Records the sync request; the fetch adapter fills the mailbox out of
/// band through `EmailRepository::store_message`.
pub async fn sync_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<SyncResponse>> {
    let repo = EmailRepository::new(state.pool.clone());

    let account = repo
        .find_account(id)
        .await?
        .filter(|a| a.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("EmailAccount", id))?;

    repo.mark_synced(id).await?;
    info!(account = %account.address, "Mailbox sync requested");

    Ok(Json(SyncResponse { queued: true }))
}

/// GET /api/email/accounts/:id/messages?folder=
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Query(query): Query<MessagesQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<EmailMessage>>> {
    let repo = EmailRepository::new(state.pool.clone());

    repo.find_account(id)
        .await?
        .filter(|a| a.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("EmailAccount", id))?;

    let folder = query.folder.unwrap_or_else(|| "INBOX".to_string());
    Ok(Json(repo.list_messages(id, &folder, *page).await?))
}

/// GET /api/email/messages/:id
pub async fn get_message(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<EmailMessage>> {
    let repo = EmailRepository::new(state.pool.clone());
    let message = repo
        .find_message(id)
        .await?
        .ok_or_else(|| ApiError::not_found("EmailMessage", id))?;
    Ok(Json(message))
}

/// PATCH /api/email/messages/:id/read
pub async fn set_read(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<SetReadRequest>,
) -> ApiResult<StatusCode> {
    let repo = EmailRepository::new(state.pool.clone());
    repo.set_read(id, dto.read).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/email/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = EmailRepository::new(state.pool.clone());
    repo.delete_message(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/email/send
pub async fn send(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<SendRequest>,
) -> ApiResult<(StatusCode, Json<EmailMessage>)> {
    let repo = EmailRepository::new(state.pool.clone());

    let account = repo
        .find_account(dto.account_id)
        .await?
        .filter(|a| a.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("EmailAccount", dto.account_id))?;

    if dto.to.is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("to", "at least one recipient required"),
        ));
    }

    let mail = OutgoingMail::new(
        MailAddress::new(account.address.clone()),
        dto.to.iter().map(MailAddress::new).collect(),
        dto.subject.clone(),
        dto.body.clone(),
    );

    state.mailer.send(&mail).await.map_err(|e| ApiError::Upstream {
        service: "mail",
        message: e.to_string(),
    })?;

    // keep a copy in the Sent folder
    let now = chrono::Utc::now();
    let stored = repo
        .store_message(StoreEmailMessage {
            account_id: account.id,
            folder: "Sent".to_string(),
            remote_uid: Some(mail.id.clone()),
            from_address: account.address,
            to_addresses: dto.to.join(", "),
            subject: dto.subject,
            body_text: Some(dto.body),
            body_html: None,
            sent_at: Some(now),
            received_at: now,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/email/providers — preset catalog for the account form
pub async fn providers() -> Json<Vec<ProviderInfo>> {
    let all = [
        MailProvider::Gmail,
        MailProvider::Outlook,
        MailProvider::Aruba,
        MailProvider::ArubaPec,
        MailProvider::Libero,
        MailProvider::Custom,
    ];

    Json(
        all.into_iter()
            .map(|provider| {
                let preset = preset_endpoints(provider);
                ProviderInfo {
                    provider,
                    imap_host: preset.map(|p| p.imap_host.to_string()),
                    smtp_host: preset.map(|p| p.smtp_host.to_string()),
                }
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[validate(email)]
    pub address: String,
    pub display_name: Option<String>,
    pub provider: MailProvider,
    pub imap_host: Option<String>,
    pub imap_port: Option<i32>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<i32>,
    pub credential_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetReadRequest {
    pub read: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub account_id: Id,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub queued: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider: MailProvider,
    pub imap_host: Option<String>,
    pub smtp_host: Option<String>,
}
