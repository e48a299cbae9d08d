//! Chat handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pulse_core::traits::Id;
use pulse_db::chat::{ChatRepository, CreateChannel, UpdateChannel};
use pulse_models::chat::{Channel, ChannelKind, ChatMessage};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/chat/channels
pub async fn list_channels(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Channel>>> {
    let repo = ChatRepository::new(state.pool.clone());
    Ok(Json(repo.list_channels().await?))
}

/// POST /api/chat/channels
pub async fn create_channel(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateChannelRequest>,
) -> ApiResult<(StatusCode, Json<Channel>)> {
    if dto.name.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("name", "is required"),
        ));
    }

    let repo = ChatRepository::new(state.pool.clone());
    let channel = repo
        .create_channel(CreateChannel {
            name: dto.name,
            kind: dto.kind,
            topic: dto.topic,
            created_by: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(channel)))
}

/// PATCH /api/chat/channels/:id
pub async fn update_channel(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateChannelRequest>,
) -> ApiResult<Json<Channel>> {
    let repo = ChatRepository::new(state.pool.clone());
    let channel = repo
        .update_channel(
            id,
            UpdateChannel {
                name: dto.name,
                topic: dto.topic,
            },
        )
        .await?;
    Ok(Json(channel))
}

/// DELETE /api/chat/channels/:id
pub async fn delete_channel(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = ChatRepository::new(state.pool.clone());
    repo.delete_channel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/chat/channels/:id/messages?before=&limit=
pub async fn list_messages(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let repo = ChatRepository::new(state.pool.clone());

    repo.find_channel(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Channel", id))?;

    let messages = repo
        .list_messages(id, query.before, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(messages))
}

/// POST /api/chat/channels/:id/messages
pub async fn create_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<CreateMessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    if dto.body.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("body", "is required"),
        ));
    }

    let repo = ChatRepository::new(state.pool.clone());
    repo.find_channel(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Channel", id))?;

    let message = repo.create_message(id, user.id, &dto.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// DELETE /api/chat/messages/:id (own messages only)
pub async fn delete_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = ChatRepository::new(state.pool.clone());
    repo.delete_message(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChannelRequest {
    pub name: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub before: Option<Id>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
}
