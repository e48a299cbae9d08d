//! Finance services: payment registration and quote acceptance

use pulse_core::traits::Id;
use pulse_db::finance::{CreateInvoice, FinanceRepository, RegisterPayment};
use pulse_db::repository::RepositoryError;
use pulse_models::finance::{Invoice, InvoiceStatus, Quote, QuoteStatus};
use sqlx::PgPool;
use tracing::info;

use crate::result::ServiceResult;

/// Registers payments against invoices, holding the paid-total invariant.
pub struct PaymentService {
    finance: FinanceRepository,
}

impl PaymentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            finance: FinanceRepository::new(pool),
        }
    }

    /// Register a payment. Fails with field errors when the amount is not
    /// positive or would push `totale_pagato` past `importo`.
    pub async fn register(
        &self,
        invoice_id: Id,
        payment: RegisterPayment,
    ) -> Result<ServiceResult<Invoice>, RepositoryError> {
        let Some(invoice) = self.finance.find_invoice(invoice_id).await? else {
            return Ok(ServiceResult::failure_with_base_error(format!(
                "Invoice {} not found",
                invoice_id
            )));
        };

        if invoice.status == InvoiceStatus::Draft {
            return Ok(ServiceResult::failure_with_error(
                "status",
                "draft invoices cannot receive payments",
            ));
        }

        if let Err(errors) = invoice.validate_payment(payment.amount) {
            return Ok(ServiceResult::failure(errors));
        }

        match self.finance.register_payment(invoice_id, payment).await {
            Ok(updated) => {
                info!(
                    invoice = %updated.number,
                    totale_pagato = updated.totale_pagato,
                    "Payment registered"
                );
                Ok(ServiceResult::success(updated))
            }
            // concurrent payment won the race; report it as a field error
            Err(RepositoryError::Conflict(msg)) => {
                Ok(ServiceResult::failure_with_error("amount", msg))
            }
            Err(other) => Err(other),
        }
    }
}

/// Turns accepted quotes into draft invoices.
pub struct QuoteService {
    finance: FinanceRepository,
}

impl QuoteService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            finance: FinanceRepository::new(pool),
        }
    }

    /// Accept a quote and generate a draft invoice for the same customer and
    /// amount. The quote keeps a pointer to the generated invoice.
    pub async fn accept(
        &self,
        quote_id: Id,
        invoice_number: String,
        created_by: Id,
    ) -> Result<ServiceResult<Quote>, RepositoryError> {
        let Some(quote) = self.finance.find_quote(quote_id).await? else {
            return Ok(ServiceResult::failure_with_base_error(format!(
                "Quote {} not found",
                quote_id
            )));
        };

        match quote.status {
            QuoteStatus::Accepted => {
                return Ok(ServiceResult::failure_with_error(
                    "status",
                    "quote is already accepted",
                ));
            }
            QuoteStatus::Rejected | QuoteStatus::Expired => {
                return Ok(ServiceResult::failure_with_error(
                    "status",
                    "closed quotes cannot be accepted",
                ));
            }
            QuoteStatus::Draft | QuoteStatus::Sent => {}
        }

        let today = chrono::Utc::now().date_naive();
        let invoice = self
            .finance
            .create_invoice(CreateInvoice {
                number: invoice_number,
                customer_name: quote.customer_name.clone(),
                customer_vat: None,
                issue_date: today,
                due_date: today + chrono::Duration::days(30),
                importo: quote.importo,
                notes: Some(format!("Generated from quote {}", quote.number)),
                created_by,
                lines: Vec::new(),
            })
            .await?;

        self.finance.link_quote_invoice(quote_id, invoice.id).await?;
        let accepted = self
            .finance
            .set_quote_status(quote_id, QuoteStatus::Accepted)
            .await?;

        info!(quote = %accepted.number, invoice = %invoice.number, "Quote accepted");
        Ok(ServiceResult::success(accepted))
    }
}
