//! HR handlers: employees, shifts, payslip parsing

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::hr::{CreateEmployee, CreateShift, HrRepository, UpdateEmployee, UpdateShift};
use pulse_models::hr::{Employee, PayslipData, Shift};
use pulse_services::hr::ShiftPlanner;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/hr/employees
pub async fn list_employees(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    page: Page,
) -> ApiResult<Json<Paginated<Employee>>> {
    let repo = HrRepository::new(state.pool.clone());
    Ok(Json(repo.list_employees(*page).await?))
}

/// GET /api/hr/employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Employee>> {
    let repo = HrRepository::new(state.pool.clone());
    let employee = repo
        .find_employee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", id))?;
    Ok(Json(employee))
}

/// POST /api/hr/employees
pub async fn create_employee(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let repo = HrRepository::new(state.pool.clone());
    let employee = repo
        .create_employee(CreateEmployee {
            user_id: dto.user_id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            role: dto.role,
            hired_on: dto.hired_on,
            hourly_cost: dto.hourly_cost,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PATCH /api/hr/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateEmployeeRequest>,
) -> ApiResult<Json<Employee>> {
    let repo = HrRepository::new(state.pool.clone());
    let employee = repo
        .update_employee(
            id,
            UpdateEmployee {
                first_name: dto.first_name,
                last_name: dto.last_name,
                role: dto.role,
                terminated_on: dto.terminated_on,
                hourly_cost: dto.hourly_cost,
            },
        )
        .await?;
    Ok(Json(employee))
}

/// DELETE /api/hr/employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = HrRepository::new(state.pool.clone());
    repo.delete_employee(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/hr/shifts?employeeId=&from=&to=
pub async fn list_shifts(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ShiftQuery>,
) -> ApiResult<Json<Vec<Shift>>> {
    let repo = HrRepository::new(state.pool.clone());

    let from = query
        .from
        .unwrap_or_else(|| Utc::now() - chrono::Duration::days(7));
    let to = query
        .to
        .unwrap_or_else(|| Utc::now() + chrono::Duration::days(30));

    Ok(Json(repo.list_shifts(query.employee_id, from, to).await?))
}

/// POST /api/hr/shifts
///
/// 422 on inverted intervals or same-employee overlap.
pub async fn create_shift(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateShiftRequest>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let planner = ShiftPlanner::new(state.pool.clone());
    let result = planner
        .plan(CreateShift {
            employee_id: dto.employee_id,
            starts_at: dto.starts_at,
            ends_at: dto.ends_at,
            notes: dto.notes,
        })
        .await?;

    let shift = result.into_result().map_err(ApiError::Validation)?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// PATCH /api/hr/shifts/:id — same overlap rules as creation
pub async fn update_shift(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateShiftRequest>,
) -> ApiResult<Json<Shift>> {
    let planner = ShiftPlanner::new(state.pool.clone());
    let result = planner
        .replan(
            id,
            UpdateShift {
                starts_at: dto.starts_at,
                ends_at: dto.ends_at,
                notes: dto.notes,
            },
        )
        .await?;

    let shift = result.into_result().map_err(ApiError::Validation)?;
    Ok(Json(shift))
}

/// DELETE /api/hr/shifts/:id
pub async fn delete_shift(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = HrRepository::new(state.pool.clone());
    repo.delete_shift(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/hr/payslips/parse — extract fields from a cedolino via AI
pub async fn parse_payslip(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<ParsePayslipRequest>,
) -> ApiResult<Json<PayslipData>> {
    if dto.text.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("text", "is required"),
        ));
    }

    let ai = state.ai()?;
    let data = ai.parse_payslip(&dto.text).await?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub user_id: Option<Id>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub hired_on: NaiveDate,
    pub hourly_cost: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub terminated_on: Option<NaiveDate>,
    pub hourly_cost: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftQuery {
    pub employee_id: Option<Id>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftRequest {
    pub employee_id: Id,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShiftRequest {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParsePayslipRequest {
    pub text: String,
}
