//! User administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::repository::Repository;
use pulse_db::users::{CreateUser, UpdateUser, UserRepository};
use pulse_models::user::{User, UserStatus};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AppState, AuthenticatedUser, Page};

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    page: Page,
) -> ApiResult<Json<Paginated<User>>> {
    let repo = UserRepository::new(state.pool.clone());
    Ok(Json(repo.list(*page).await?))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<User>> {
    let repo = UserRepository::new(state.pool.clone());
    let record = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(Json(record))
}

/// POST /api/users (admin)
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(dto): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    dto.validate()?;

    let repo = UserRepository::new(state.pool.clone());

    if !repo.is_login_unique(&dto.login, None).await? {
        return Err(ApiError::Conflict(format!(
            "Login {} is already taken",
            dto.login
        )));
    }
    if !repo.is_email_unique(&dto.email, None).await? {
        return Err(ApiError::Conflict(format!(
            "Email {} is already taken",
            dto.email
        )));
    }
    if dto.password.len() < state.config.auth.password_min_length {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single(
                "password",
                format!(
                    "must be at least {} characters",
                    state.config.auth.password_min_length
                ),
            ),
        ));
    }

    let password_hash =
        pulse_auth::hash_password(&dto.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = repo
        .create(CreateUser {
            login: dto.login,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            admin: dto.admin,
            status: UserStatus::Active,
            password_hash: Some(password_hash),
            language: dto.language,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .update(
            id,
            UpdateUser {
                first_name: dto.first_name,
                last_name: dto.last_name,
                email: dto.email,
                admin: dto.admin,
                status: dto.status,
                language: dto.language,
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = UserRepository::new(state.pool.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub login: String,
    #[validate(length(max = 255))]
    pub first_name: String,
    #[validate(length(max = 255))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
    pub status: Option<UserStatus>,
    pub language: Option<String>,
}
