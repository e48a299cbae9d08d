//! Dashboard handler

use axum::{extract::State, Json};
use pulse_db::dashboard::{DashboardRepository, DashboardSnapshot};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/dashboard — aggregate counters in one round trip
pub async fn snapshot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<DashboardSnapshot>> {
    let repo = DashboardRepository::new(state.pool.clone());
    Ok(Json(repo.snapshot(user.id).await?))
}
