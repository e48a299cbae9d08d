//! Warehouse handlers: transport documents (DDT)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::warehouse::{CreateDdt, CreateDdtLine, UpdateDdt, WarehouseRepository};
use pulse_models::warehouse::{Ddt, DdtLine, DdtStatus};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/warehouse/ddt?status=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<DdtQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Ddt>>> {
    let repo = WarehouseRepository::new(state.pool.clone());
    Ok(Json(repo.list(query.status, *page).await?))
}

/// GET /api/warehouse/ddt/:id — document with lines
pub async fn get(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<DdtDetail>> {
    let repo = WarehouseRepository::new(state.pool.clone());

    let ddt = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ddt", id))?;
    let lines = repo.list_lines(id).await?;

    Ok(Json(DdtDetail { ddt, lines }))
}

/// POST /api/warehouse/ddt
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateDdtRequest>,
) -> ApiResult<(StatusCode, Json<Ddt>)> {
    let mut errors = pulse_core::error::ValidationErrors::new();
    if dto.number.trim().is_empty() {
        errors.add("number", "is required");
    }
    if dto.destination.trim().is_empty() {
        errors.add("destination", "is required");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let repo = WarehouseRepository::new(state.pool.clone());
    let ddt = repo
        .create(CreateDdt {
            number: dto.number,
            customer_name: dto.customer_name,
            destination: dto.destination,
            carrier: dto.carrier,
            transport_date: dto.transport_date,
            invoice_id: dto.invoice_id,
            notes: dto.notes,
            created_by: user.id,
            lines: dto
                .lines
                .into_iter()
                .map(|l| CreateDdtLine {
                    description: l.description,
                    quantity: l.quantity,
                    unit: l.unit,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ddt)))
}

/// PATCH /api/warehouse/ddt/:id
pub async fn update(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateDdtRequest>,
) -> ApiResult<Json<Ddt>> {
    let repo = WarehouseRepository::new(state.pool.clone());
    let ddt = repo
        .update(
            id,
            UpdateDdt {
                destination: dto.destination,
                carrier: dto.carrier,
                tracking_code: dto.tracking_code,
                status: dto.status,
                transport_date: dto.transport_date,
                notes: dto.notes,
            },
        )
        .await?;
    Ok(Json(ddt))
}

/// DELETE /api/warehouse/ddt/:id
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = WarehouseRepository::new(state.pool.clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct DdtQuery {
    pub status: Option<DdtStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DdtDetail {
    #[serde(flatten)]
    pub ddt: Ddt,
    pub lines: Vec<DdtLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDdtRequest {
    pub number: String,
    pub customer_name: String,
    pub destination: String,
    pub carrier: Option<String>,
    pub transport_date: NaiveDate,
    pub invoice_id: Option<Id>,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<DdtLineRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdtLineRequest {
    pub description: String,
    pub quantity: i64,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDdtRequest {
    pub destination: Option<String>,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub status: Option<DdtStatus>,
    pub transport_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
