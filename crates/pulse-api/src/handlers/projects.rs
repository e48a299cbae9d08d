//! Project handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::projects::{CreateProject, ProjectRepository, UpdateProject};
use pulse_db::repository::Repository;
use pulse_models::todo::Project;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    page: Page,
) -> ApiResult<Json<Paginated<Project>>> {
    let repo = ProjectRepository::new(state.pool.clone());
    Ok(Json(repo.list(*page).await?))
}

/// GET /api/projects/:id
pub async fn get(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Project>> {
    let repo = ProjectRepository::new(state.pool.clone());
    let project = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project", id))?;
    Ok(Json(project))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    if dto.name.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("name", "is required"),
        ));
    }

    let repo = ProjectRepository::new(state.pool.clone());
    let project = repo
        .create(CreateProject {
            name: dto.name,
            description: dto.description,
            color: dto.color,
            owner_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// PATCH /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let repo = ProjectRepository::new(state.pool.clone());
    let project = repo
        .update(
            id,
            UpdateProject {
                name: dto.name,
                description: dto.description,
                color: dto.color,
                archived: dto.archived,
            },
        )
        .await?;
    Ok(Json(project))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = ProjectRepository::new(state.pool.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub archived: Option<bool>,
}
