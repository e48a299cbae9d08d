//! Authentication handlers

use axum::{extract::State, Json};
use pulse_auth::verify_password;
use pulse_db::users::UserRepository;
use pulse_models::user::User;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(dto): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.pool.clone());

    let user = repo
        .find_by_login(&dto.login)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if user.is_locked() {
        return Err(ApiError::forbidden("Account is locked"));
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&dto.password, hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state
        .jwt
        .create_token(
            user.id,
            Some(user.login.clone()),
            user.admin,
            state.config.auth.token_expiration_seconds,
        )
        .map_err(|e| ApiError::internal(e.to_string()))?;

    repo.update_last_login(user.id).await?;
    info!(login = %user.login, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<User>> {
    use pulse_db::repository::Repository;

    let repo = UserRepository::new(state.pool.clone());
    let record = repo
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", user.id))?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
