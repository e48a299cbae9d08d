//! Warehouse repository: transport documents (DDT)

use chrono::NaiveDate;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::warehouse::{Ddt, DdtLine, DdtStatus};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const DDT_COLUMNS: &str = "id, number, customer_name, destination, carrier, tracking_code, \
     status, transport_date, invoice_id, notes, created_by, created_at, updated_at";
const LINE_COLUMNS: &str = "id, ddt_id, description, quantity, unit, position";

#[derive(Debug, Clone)]
pub struct CreateDdtLine {
    pub description: String,
    pub quantity: i64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDdt {
    pub number: String,
    pub customer_name: String,
    pub destination: String,
    pub carrier: Option<String>,
    pub transport_date: NaiveDate,
    pub invoice_id: Option<Id>,
    pub notes: Option<String>,
    pub created_by: Id,
    pub lines: Vec<CreateDdtLine>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDdt {
    pub destination: Option<String>,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub status: Option<DdtStatus>,
    pub transport_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub struct WarehouseRepository {
    pool: PgPool,
}

impl WarehouseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Id) -> RepositoryResult<Option<Ddt>> {
        let row = sqlx::query_as::<_, Ddt>(&format!(
            "SELECT {DDT_COLUMNS} FROM ddt WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(
        &self,
        status: Option<DdtStatus>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Ddt>> {
        let items = sqlx::query_as::<_, Ddt>(&format!(
            "SELECT {DDT_COLUMNS} FROM ddt \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY transport_date DESC, number DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ddt WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create(&self, dto: CreateDdt) -> RepositoryResult<Ddt> {
        let mut tx = self.pool.begin().await?;

        let ddt = sqlx::query_as::<_, Ddt>(&format!(
            "INSERT INTO ddt (number, customer_name, destination, carrier, status, \
                 transport_date, invoice_id, notes, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             RETURNING {DDT_COLUMNS}"
        ))
        .bind(&dto.number)
        .bind(&dto.customer_name)
        .bind(&dto.destination)
        .bind(&dto.carrier)
        .bind(DdtStatus::Draft)
        .bind(dto.transport_date)
        .bind(dto.invoice_id)
        .bind(&dto.notes)
        .bind(dto.created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in dto.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO ddt_lines (ddt_id, description, quantity, unit, position) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(ddt.id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ddt)
    }

    pub async fn update(&self, id: Id, dto: UpdateDdt) -> RepositoryResult<Ddt> {
        let row = sqlx::query_as::<_, Ddt>(&format!(
            "UPDATE ddt SET \
                 destination = COALESCE($1, destination), \
                 carrier = COALESCE($2, carrier), \
                 tracking_code = COALESCE($3, tracking_code), \
                 status = COALESCE($4, status), \
                 transport_date = COALESCE($5, transport_date), \
                 notes = COALESCE($6, notes), \
                 updated_at = NOW() \
             WHERE id = $7 \
             RETURNING {DDT_COLUMNS}"
        ))
        .bind(&dto.destination)
        .bind(&dto.carrier)
        .bind(&dto.tracking_code)
        .bind(dto.status)
        .bind(dto.transport_date)
        .bind(&dto.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Ddt", id))?;

        Ok(row)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ddt_lines WHERE ddt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM ddt WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Ddt", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_lines(&self, ddt_id: Id) -> RepositoryResult<Vec<DdtLine>> {
        let rows = sqlx::query_as::<_, DdtLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM ddt_lines WHERE ddt_id = $1 ORDER BY position ASC"
        ))
        .bind(ddt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Shipments visible to a portal customer, newest first.
    pub async fn for_customer(&self, customer: &str) -> RepositoryResult<Vec<Ddt>> {
        let rows = sqlx::query_as::<_, Ddt>(&format!(
            "SELECT {DDT_COLUMNS} FROM ddt \
             WHERE customer_name = $1 AND status != 'draft' \
             ORDER BY transport_date DESC"
        ))
        .bind(customer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
