//! Task handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::tasks::{CreateTask, TaskFilter, TaskRepository, UpdateTask};
use pulse_models::todo::{Task, TaskPriority, TaskStatus};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/tasks?projectId=&assigneeId=&status=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<TaskFilterQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Task>>> {
    let repo = TaskRepository::new(state.pool.clone());
    let result = repo
        .list(
            TaskFilter {
                project_id: filter.project_id,
                assignee_id: filter.assignee_id,
                status: filter.status,
            },
            *page,
        )
        .await?;
    Ok(Json(result))
}

/// GET /api/tasks/:id
pub async fn get(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Task>> {
    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task", id))?;
    Ok(Json(task))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if dto.title.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("title", "is required"),
        ));
    }

    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .create(CreateTask {
            title: dto.title,
            description: dto.description,
            priority: dto.priority.unwrap_or(TaskPriority::Normal),
            project_id: dto.project_id,
            assignee_id: dto.assignee_id,
            creator_id: user.id,
            due_date: dto.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/tasks/:id
pub async fn update(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let repo = TaskRepository::new(state.pool.clone());
    let task = repo
        .update(
            id,
            UpdateTask {
                title: dto.title,
                description: dto.description,
                priority: dto.priority,
                project_id: dto.project_id,
                assignee_id: dto.assignee_id,
                due_date: dto.due_date,
                position: dto.position,
            },
        )
        .await?;
    Ok(Json(task))
}

/// PATCH /api/tasks/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<SetStatusRequest>,
) -> ApiResult<Json<Task>> {
    let repo = TaskRepository::new(state.pool.clone());
    let task = repo.set_status(id, dto.status).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id (soft)
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = TaskRepository::new(state.pool.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilterQuery {
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub due_date: Option<NaiveDate>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TaskStatus,
}
