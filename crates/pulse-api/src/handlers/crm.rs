//! CRM handlers: leads and opportunities

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::crm::{CreateLead, CreateOpportunity, CrmRepository, UpdateLead, UpdateOpportunity};
use pulse_models::crm::{Lead, LeadStatus, Opportunity, OpportunityStage};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/crm/leads?status=
pub async fn list_leads(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<LeadQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Lead>>> {
    let repo = CrmRepository::new(state.pool.clone());
    Ok(Json(repo.list_leads(query.status, *page).await?))
}

/// GET /api/crm/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Lead>> {
    let repo = CrmRepository::new(state.pool.clone());
    let lead = repo
        .find_lead(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead", id))?;
    Ok(Json(lead))
}

/// POST /api/crm/leads
pub async fn create_lead(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateLeadRequest>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    dto.validate()?;
    if dto.company.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("company", "is required"),
        ));
    }

    let repo = CrmRepository::new(state.pool.clone());
    let lead = repo
        .create_lead(CreateLead {
            company: dto.company,
            contact_name: dto.contact_name,
            email: dto.email,
            phone: dto.phone,
            source: dto.source,
            notes: dto.notes,
            owner_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// PATCH /api/crm/leads/:id
pub async fn update_lead(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateLeadRequest>,
) -> ApiResult<Json<Lead>> {
    let repo = CrmRepository::new(state.pool.clone());
    let lead = repo
        .update_lead(
            id,
            UpdateLead {
                company: dto.company,
                contact_name: dto.contact_name,
                email: dto.email,
                phone: dto.phone,
                source: dto.source,
                status: dto.status,
                notes: dto.notes,
            },
        )
        .await?;
    Ok(Json(lead))
}

/// DELETE /api/crm/leads/:id
pub async fn delete_lead(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = CrmRepository::new(state.pool.clone());
    repo.delete_lead(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/crm/leads/:id/convert
pub async fn convert_lead(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<ConvertLeadRequest>,
) -> ApiResult<(StatusCode, Json<Opportunity>)> {
    let repo = CrmRepository::new(state.pool.clone());

    let lead = repo
        .find_lead(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead", id))?;

    let opportunity = repo
        .convert_lead(
            id,
            CreateOpportunity {
                title: dto.title.unwrap_or_else(|| lead.company.clone()),
                lead_id: Some(id),
                stage: OpportunityStage::Prospecting,
                amount: dto.amount.unwrap_or(0),
                probability: dto.probability.unwrap_or(10),
                expected_close: dto.expected_close,
                owner_id: user.id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// GET /api/crm/opportunities?stage=
pub async fn list_opportunities(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<OpportunityQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Opportunity>>> {
    let repo = CrmRepository::new(state.pool.clone());
    Ok(Json(repo.list_opportunities(query.stage, *page).await?))
}

/// POST /api/crm/opportunities
pub async fn create_opportunity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateOpportunityRequest>,
) -> ApiResult<(StatusCode, Json<Opportunity>)> {
    let repo = CrmRepository::new(state.pool.clone());
    let opportunity = repo
        .create_opportunity(CreateOpportunity {
            title: dto.title,
            lead_id: dto.lead_id,
            stage: dto.stage.unwrap_or(OpportunityStage::Prospecting),
            amount: dto.amount,
            probability: dto.probability.clamp(0, 100),
            expected_close: dto.expected_close,
            owner_id: user.id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// PATCH /api/crm/opportunities/:id
pub async fn update_opportunity(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateOpportunityRequest>,
) -> ApiResult<Json<Opportunity>> {
    let repo = CrmRepository::new(state.pool.clone());
    let opportunity = repo
        .update_opportunity(
            id,
            UpdateOpportunity {
                title: dto.title,
                stage: dto.stage,
                amount: dto.amount,
                probability: dto.probability.map(|p| p.clamp(0, 100)),
                expected_close: dto.expected_close,
            },
        )
        .await?;
    Ok(Json(opportunity))
}

/// DELETE /api/crm/opportunities/:id
pub async fn delete_opportunity(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = CrmRepository::new(state.pool.clone());
    repo.delete_opportunity(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct LeadQuery {
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Deserialize)]
pub struct OpportunityQuery {
    pub stage: Option<OpportunityStage>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub company: String,
    pub contact_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLeadRequest {
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub probability: Option<i32>,
    pub expected_close: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityRequest {
    pub title: String,
    pub lead_id: Option<Id>,
    pub stage: Option<OpportunityStage>,
    pub amount: i64,
    #[serde(default = "default_probability")]
    pub probability: i32,
    pub expected_close: Option<NaiveDate>,
}

fn default_probability() -> i32 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityRequest {
    pub title: Option<String>,
    pub stage: Option<OpportunityStage>,
    pub amount: Option<i64>,
    pub probability: Option<i32>,
    pub expected_close: Option<NaiveDate>,
}
