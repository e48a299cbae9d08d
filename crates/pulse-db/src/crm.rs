//! CRM repositories: leads and opportunities

use chrono::NaiveDate;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::crm::{Lead, LeadStatus, Opportunity, OpportunityStage};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const LEAD_COLUMNS: &str = "id, company, contact_name, email, phone, source, status, notes, \
     owner_id, created_at, updated_at";
const OPPORTUNITY_COLUMNS: &str = "id, title, lead_id, stage, amount, probability, \
     expected_close, owner_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateLead {
    pub company: String,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub owner_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLead {
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateOpportunity {
    pub title: String,
    pub lead_id: Option<Id>,
    pub stage: OpportunityStage,
    pub amount: i64,
    pub probability: i32,
    pub expected_close: Option<NaiveDate>,
    pub owner_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOpportunity {
    pub title: Option<String>,
    pub stage: Option<OpportunityStage>,
    pub amount: Option<i64>,
    pub probability: Option<i32>,
    pub expected_close: Option<NaiveDate>,
}

pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_lead(&self, id: Id) -> RepositoryResult<Option<Lead>> {
        let row = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_leads(
        &self,
        status: Option<LeadStatus>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Lead>> {
        let items = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leads WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create_lead(&self, dto: CreateLead) -> RepositoryResult<Lead> {
        let row = sqlx::query_as::<_, Lead>(&format!(
            "INSERT INTO leads (company, contact_name, email, phone, source, status, notes, \
                 owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) \
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(&dto.company)
        .bind(&dto.contact_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.source)
        .bind(LeadStatus::New)
        .bind(&dto.notes)
        .bind(dto.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_lead(&self, id: Id, dto: UpdateLead) -> RepositoryResult<Lead> {
        let row = sqlx::query_as::<_, Lead>(&format!(
            "UPDATE leads SET \
                 company = COALESCE($1, company), \
                 contact_name = COALESCE($2, contact_name), \
                 email = COALESCE($3, email), \
                 phone = COALESCE($4, phone), \
                 source = COALESCE($5, source), \
                 status = COALESCE($6, status), \
                 notes = COALESCE($7, notes), \
                 updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(&dto.company)
        .bind(&dto.contact_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.source)
        .bind(dto.status)
        .bind(&dto.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Lead", id))?;

        Ok(row)
    }

    pub async fn delete_lead(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Lead", id));
        }

        Ok(())
    }

    /// Convert a lead: create an opportunity from it and mark the lead
    /// converted, atomically.
    pub async fn convert_lead(
        &self,
        lead_id: Id,
        dto: CreateOpportunity,
    ) -> RepositoryResult<Opportunity> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE leads SET status = $1, updated_at = NOW() WHERE id = $2 AND status != $1",
        )
        .bind(LeadStatus::Converted)
        .bind(lead_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "Lead {} is missing or already converted",
                lead_id
            )));
        }

        let opportunity = sqlx::query_as::<_, Opportunity>(&format!(
            "INSERT INTO opportunities (title, lead_id, stage, amount, probability, \
                 expected_close, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(lead_id)
        .bind(dto.stage)
        .bind(dto.amount)
        .bind(dto.probability)
        .bind(dto.expected_close)
        .bind(dto.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(opportunity)
    }

    pub async fn find_opportunity(&self, id: Id) -> RepositoryResult<Option<Opportunity>> {
        let row = sqlx::query_as::<_, Opportunity>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_opportunities(
        &self,
        stage: Option<OpportunityStage>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Opportunity>> {
        let items = sqlx::query_as::<_, Opportunity>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities \
             WHERE ($1::text IS NULL OR stage = $1) \
             ORDER BY expected_close ASC NULLS LAST, created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(stage)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM opportunities WHERE ($1::text IS NULL OR stage = $1)",
        )
        .bind(stage)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create_opportunity(
        &self,
        dto: CreateOpportunity,
    ) -> RepositoryResult<Opportunity> {
        let row = sqlx::query_as::<_, Opportunity>(&format!(
            "INSERT INTO opportunities (title, lead_id, stage, amount, probability, \
                 expected_close, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(dto.lead_id)
        .bind(dto.stage)
        .bind(dto.amount)
        .bind(dto.probability)
        .bind(dto.expected_close)
        .bind(dto.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_opportunity(
        &self,
        id: Id,
        dto: UpdateOpportunity,
    ) -> RepositoryResult<Opportunity> {
        let row = sqlx::query_as::<_, Opportunity>(&format!(
            "UPDATE opportunities SET \
                 title = COALESCE($1, title), \
                 stage = COALESCE($2, stage), \
                 amount = COALESCE($3, amount), \
                 probability = COALESCE($4, probability), \
                 expected_close = COALESCE($5, expected_close), \
                 updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(dto.stage)
        .bind(dto.amount)
        .bind(dto.probability)
        .bind(dto.expected_close)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Opportunity", id))?;

        Ok(row)
    }

    pub async fn delete_opportunity(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Opportunity", id));
        }

        Ok(())
    }
}
