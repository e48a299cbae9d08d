//! Finance repositories: invoices, payments, quotes
//!
//! `totale_pagato` is an accumulated column kept in sync with the
//! `invoice_payments` ledger inside one transaction per payment.

use chrono::NaiveDate;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::finance::{
    Invoice, InvoiceLine, InvoicePayment, InvoiceStatus, Quote, QuoteStatus,
};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const INVOICE_COLUMNS: &str = "id, number, customer_name, customer_vat, status, issue_date, \
     due_date, importo, totale_pagato, notes, created_by, created_at, updated_at";
const LINE_COLUMNS: &str = "id, invoice_id, description, quantity, unit_price, vat_rate, position";
const PAYMENT_COLUMNS: &str = "id, invoice_id, amount, method, reference, paid_at";
const QUOTE_COLUMNS: &str = "id, number, customer_name, status, issue_date, valid_until, \
     importo, invoice_id, notes, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateInvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub vat_rate: i32,
}

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub number: String,
    pub customer_name: String,
    pub customer_vat: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub importo: i64,
    pub notes: Option<String>,
    pub created_by: Id,
    pub lines: Vec<CreateInvoiceLine>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub customer_name: Option<String>,
    pub customer_vat: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterPayment {
    pub amount: i64,
    pub method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateQuote {
    pub number: String,
    pub customer_name: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub importo: i64,
    pub notes: Option<String>,
    pub created_by: Id,
}

pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_invoice(&self, id: Id) -> RepositoryResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
        customer: Option<&str>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Invoice>> {
        let items = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR customer_name = $2) \
             ORDER BY issue_date DESC, number DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(status)
        .bind(customer)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR customer_name = $2)",
        )
        .bind(status)
        .bind(customer)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    /// Create an invoice with its lines in one transaction.
    pub async fn create_invoice(&self, dto: CreateInvoice) -> RepositoryResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "INSERT INTO invoices (number, customer_name, customer_vat, status, issue_date, \
                 due_date, importo, totale_pagato, notes, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9, NOW(), NOW()) \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(&dto.number)
        .bind(&dto.customer_name)
        .bind(&dto.customer_vat)
        .bind(InvoiceStatus::Draft)
        .bind(dto.issue_date)
        .bind(dto.due_date)
        .bind(dto.importo)
        .bind(&dto.notes)
        .bind(dto.created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in dto.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO invoice_lines (invoice_id, description, quantity, unit_price, \
                     vat_rate, position) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(invoice.id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.vat_rate)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(invoice)
    }

    pub async fn update_invoice(&self, id: Id, dto: UpdateInvoice) -> RepositoryResult<Invoice> {
        let row = sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE invoices SET \
                 customer_name = COALESCE($1, customer_name), \
                 customer_vat = COALESCE($2, customer_vat), \
                 status = COALESCE($3, status), \
                 due_date = COALESCE($4, due_date), \
                 notes = COALESCE($5, notes), \
                 updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(&dto.customer_name)
        .bind(&dto.customer_vat)
        .bind(dto.status)
        .bind(dto.due_date)
        .bind(&dto.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Invoice", id))?;

        Ok(row)
    }

    pub async fn delete_invoice(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoice_payments WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM invoice_lines WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Invoice", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_lines(&self, invoice_id: Id) -> RepositoryResult<Vec<InvoiceLine>> {
        let rows = sqlx::query_as::<_, InvoiceLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM invoice_lines WHERE invoice_id = $1 ORDER BY position ASC"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_payments(&self, invoice_id: Id) -> RepositoryResult<Vec<InvoicePayment>> {
        let rows = sqlx::query_as::<_, InvoicePayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM invoice_payments \
             WHERE invoice_id = $1 ORDER BY paid_at ASC"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Append to the payment ledger and bump the accumulated total in one
    /// transaction. The `totale_pagato + $1 <= importo` guard in the UPDATE
    /// re-asserts the invariant even under concurrent payments; zero rows
    /// affected means the payment would overshoot.
    pub async fn register_payment(
        &self,
        invoice_id: Id,
        dto: RegisterPayment,
    ) -> RepositoryResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE invoices SET \
                 totale_pagato = totale_pagato + $1, \
                 status = CASE WHEN totale_pagato + $1 >= importo THEN 'paid' \
                               ELSE 'partially_paid' END, \
                 updated_at = NOW() \
             WHERE id = $2 AND totale_pagato + $1 <= importo \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(dto.amount)
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::Conflict(format!(
                "Payment of {} exceeds residual on invoice {}",
                dto.amount, invoice_id
            ))
        })?;

        sqlx::query(
            "INSERT INTO invoice_payments (invoice_id, amount, method, reference, paid_at) \
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(invoice_id)
        .bind(dto.amount)
        .bind(&dto.method)
        .bind(&dto.reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn count_unpaid(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices WHERE status NOT IN ('paid', 'draft')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn find_quote(&self, id: Id) -> RepositoryResult<Option<Quote>> {
        let row = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_quotes(
        &self,
        status: Option<QuoteStatus>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Quote>> {
        let items = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY issue_date DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quotes WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create_quote(&self, dto: CreateQuote) -> RepositoryResult<Quote> {
        let row = sqlx::query_as::<_, Quote>(&format!(
            "INSERT INTO quotes (number, customer_name, status, issue_date, valid_until, \
                 importo, notes, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) \
             RETURNING {QUOTE_COLUMNS}"
        ))
        .bind(&dto.number)
        .bind(&dto.customer_name)
        .bind(QuoteStatus::Draft)
        .bind(dto.issue_date)
        .bind(dto.valid_until)
        .bind(dto.importo)
        .bind(&dto.notes)
        .bind(dto.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn set_quote_status(&self, id: Id, status: QuoteStatus) -> RepositoryResult<Quote> {
        let row = sqlx::query_as::<_, Quote>(&format!(
            "UPDATE quotes SET status = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING {QUOTE_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Quote", id))?;

        Ok(row)
    }

    /// Link the invoice generated from an accepted quote.
    pub async fn link_quote_invoice(&self, id: Id, invoice_id: Id) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE quotes SET invoice_id = $1, updated_at = NOW() WHERE id = $2")
                .bind(invoice_id)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Quote", id));
        }

        Ok(())
    }

    pub async fn delete_quote(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Quote", id));
        }

        Ok(())
    }

    /// Invoices visible to a portal customer, newest first.
    pub async fn invoices_for_customer(&self, customer: &str) -> RepositoryResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE customer_name = $1 AND status != 'draft' \
             ORDER BY issue_date DESC"
        ))
        .bind(customer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
