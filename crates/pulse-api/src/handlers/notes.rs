//! Note handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::notes::{CreateNote, NoteRepository, UpdateNote};
use pulse_models::note::Note;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/notes?q=
pub async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<NoteQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Note>>> {
    let repo = NoteRepository::new(state.pool.clone());
    let result = repo.list(user.id, query.q.as_deref(), *page).await?;
    Ok(Json(result))
}

/// GET /api/notes/:id
pub async fn get(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Note>> {
    let repo = NoteRepository::new(state.pool.clone());
    let note = repo
        .find_by_id(id)
        .await?
        .filter(|n| n.owner_id == user.id)
        .ok_or_else(|| ApiError::not_found("Note", id))?;
    Ok(Json(note))
}

/// POST /api/notes
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let repo = NoteRepository::new(state.pool.clone());
    let note = repo
        .create(CreateNote {
            title: dto.title,
            body: dto.body,
            color: dto.color,
            pinned: dto.pinned,
            owner_id: user.id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PATCH /api/notes/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    let repo = NoteRepository::new(state.pool.clone());

    // ownership check before mutating
    repo.find_by_id(id)
        .await?
        .filter(|n| n.owner_id == user.id)
        .ok_or_else(|| ApiError::not_found("Note", id))?;

    let note = repo
        .update(
            id,
            UpdateNote {
                title: dto.title,
                body: dto.body,
                color: dto.color,
                pinned: dto.pinned,
            },
        )
        .await?;
    Ok(Json(note))
}

/// DELETE /api/notes/:id (soft)
pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = NoteRepository::new(state.pool.clone());

    repo.find_by_id(id)
        .await?
        .filter(|n| n.owner_id == user.id)
        .ok_or_else(|| ApiError::not_found("Note", id))?;

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub color: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub color: Option<String>,
    pub pinned: Option<bool>,
}
