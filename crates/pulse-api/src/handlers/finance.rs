//! Finance handlers: invoices, payments, quotes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::finance::{
    CreateInvoice, CreateInvoiceLine, CreateQuote, FinanceRepository, RegisterPayment,
    UpdateInvoice,
};
use pulse_models::finance::{
    Invoice, InvoiceLine, InvoicePayment, InvoiceStatus, Quote, QuoteStatus,
};
use pulse_services::finance::{PaymentService, QuoteService};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/finance/invoices?status=&customer=
pub async fn list_invoices(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<InvoiceQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Invoice>>> {
    let repo = FinanceRepository::new(state.pool.clone());
    Ok(Json(
        repo.list_invoices(query.status, query.customer.as_deref(), *page)
            .await?,
    ))
}

/// GET /api/finance/invoices/:id — invoice with lines and payments
pub async fn get_invoice(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<InvoiceDetail>> {
    let repo = FinanceRepository::new(state.pool.clone());

    let invoice = repo
        .find_invoice(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", id))?;
    let lines = repo.list_lines(id).await?;
    let payments = repo.list_payments(id).await?;

    Ok(Json(InvoiceDetail {
        invoice,
        lines,
        payments,
    }))
}

/// POST /api/finance/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let mut errors = pulse_core::error::ValidationErrors::new();
    if dto.number.trim().is_empty() {
        errors.add("number", "is required");
    }
    if dto.importo <= 0 {
        errors.add("importo", "must be positive");
    }
    if dto.due_date < dto.issue_date {
        errors.add("dueDate", "cannot precede issueDate");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let repo = FinanceRepository::new(state.pool.clone());
    let invoice = repo
        .create_invoice(CreateInvoice {
            number: dto.number,
            customer_name: dto.customer_name,
            customer_vat: dto.customer_vat,
            issue_date: dto.issue_date,
            due_date: dto.due_date,
            importo: dto.importo,
            notes: dto.notes,
            created_by: user.id,
            lines: dto
                .lines
                .into_iter()
                .map(|l| CreateInvoiceLine {
                    description: l.description,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    vat_rate: l.vat_rate,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// PATCH /api/finance/invoices/:id
pub async fn update_invoice(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateInvoiceRequest>,
) -> ApiResult<Json<Invoice>> {
    let repo = FinanceRepository::new(state.pool.clone());
    let invoice = repo
        .update_invoice(
            id,
            UpdateInvoice {
                customer_name: dto.customer_name,
                customer_vat: dto.customer_vat,
                status: dto.status,
                due_date: dto.due_date,
                notes: dto.notes,
            },
        )
        .await?;
    Ok(Json(invoice))
}

/// DELETE /api/finance/invoices/:id
pub async fn delete_invoice(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = FinanceRepository::new(state.pool.clone());
    repo.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/finance/invoices/:id/payments
///
/// Rejected with 422 when the amount would push the paid total past the
/// invoice total.
pub async fn register_payment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<PaymentRequest>,
) -> ApiResult<Json<Invoice>> {
    let service = PaymentService::new(state.pool.clone());
    let result = service
        .register(
            id,
            RegisterPayment {
                amount: dto.amount,
                method: dto.method,
                reference: dto.reference,
            },
        )
        .await?;

    let invoice = result.into_result().map_err(ApiError::Validation)?;
    Ok(Json(invoice))
}

/// GET /api/finance/quotes?status=
pub async fn list_quotes(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<QuoteQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Quote>>> {
    let repo = FinanceRepository::new(state.pool.clone());
    Ok(Json(repo.list_quotes(query.status, *page).await?))
}

/// POST /api/finance/quotes
pub async fn create_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateQuoteRequest>,
) -> ApiResult<(StatusCode, Json<Quote>)> {
    let repo = FinanceRepository::new(state.pool.clone());
    let quote = repo
        .create_quote(CreateQuote {
            number: dto.number,
            customer_name: dto.customer_name,
            issue_date: dto.issue_date,
            valid_until: dto.valid_until,
            importo: dto.importo,
            notes: dto.notes,
            created_by: user.id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// PATCH /api/finance/quotes/:id/status
pub async fn set_quote_status(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<QuoteStatusRequest>,
) -> ApiResult<Json<Quote>> {
    if dto.status == QuoteStatus::Accepted {
        return Err(ApiError::bad_request(
            "use the accept endpoint to accept a quote",
        ));
    }

    let repo = FinanceRepository::new(state.pool.clone());
    let quote = repo.set_quote_status(id, dto.status).await?;
    Ok(Json(quote))
}

/// POST /api/finance/quotes/:id/accept — generates the invoice
pub async fn accept_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<AcceptQuoteRequest>,
) -> ApiResult<Json<Quote>> {
    let service = QuoteService::new(state.pool.clone());
    let result = service
        .accept(id, dto.invoice_number, user.id)
        .await?;

    let quote = result.into_result().map_err(ApiError::Validation)?;
    Ok(Json(quote))
}

/// DELETE /api/finance/quotes/:id
pub async fn delete_quote(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = FinanceRepository::new(state.pool.clone());
    repo.delete_quote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
    pub customer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub status: Option<QuoteStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub lines: Vec<InvoiceLine>,
    pub payments: Vec<InvoicePayment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub number: String,
    pub customer_name: String,
    pub customer_vat: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub importo: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<InvoiceLineRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineRequest {
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    #[serde(default = "default_vat")]
    pub vat_rate: i32,
}

fn default_vat() -> i32 {
    22
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub customer_name: Option<String>,
    pub customer_vat: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: i64,
    pub method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteStatusRequest {
    pub status: QuoteStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub number: String,
    pub customer_name: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub importo: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptQuoteRequest {
    pub invoice_number: String,
}
