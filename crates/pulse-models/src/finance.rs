//! Finance module models: invoices, line items, payments, quotes
//!
//! Tables: invoices, invoice_lines, invoice_payments, quotes, quote_lines
//!
//! Field names keep the Italian accounting terms used at the API boundary:
//! `importo` is the invoice total, `totale_pagato` the amount paid so far.
//! Invariant: `totale_pagato <= importo` at all times.

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::error::ValidationErrors;
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    PartiallyPaid,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Id,
    /// Progressive number, e.g. "2025/0042"
    pub number: String,
    pub customer_name: String,
    pub customer_vat: Option<String>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Total in euro cents
    pub importo: i64,
    /// Paid so far in euro cents; never exceeds `importo`
    pub totale_pagato: i64,
    pub notes: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn residual(&self) -> i64 {
        self.importo - self.totale_pagato
    }

    pub fn is_paid(&self) -> bool {
        self.totale_pagato >= self.importo
    }

    /// Validate that registering `amount` keeps the paid total within the
    /// invoice total. Returns field-keyed errors on violation.
    pub fn validate_payment(&self, amount: i64) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if amount <= 0 {
            errors.add("amount", "must be positive");
        }
        if self.totale_pagato + amount > self.importo {
            errors.add(
                "amount",
                format!(
                    "exceeds residual: {} remaining, {} given",
                    self.residual(),
                    amount
                ),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Status derived from amounts and due date
    pub fn derived_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.status == InvoiceStatus::Draft {
            return InvoiceStatus::Draft;
        }
        if self.is_paid() {
            InvoiceStatus::Paid
        } else if self.totale_pagato > 0 {
            InvoiceStatus::PartiallyPaid
        } else if self.due_date < today {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Issued
        }
    }
}

impl Identifiable for Invoice {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Invoice {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub id: Id,
    pub invoice_id: Id,
    pub description: String,
    /// Quantity times a hundred (2 decimal places)
    pub quantity: i64,
    /// Unit price in euro cents
    pub unit_price: i64,
    /// VAT percentage, e.g. 22
    pub vat_rate: i32,
    pub position: i32,
}

impl InvoiceLine {
    /// Line total in euro cents, VAT excluded
    pub fn net_total(&self) -> i64 {
        self.quantity * self.unit_price / 100
    }

    /// Line total in euro cents, VAT included
    pub fn gross_total(&self) -> i64 {
        self.net_total() * (100 + i64::from(self.vat_rate)) / 100
    }
}

/// One registered payment against an invoice
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayment {
    pub id: Id,
    pub invoice_id: Id,
    /// Amount in euro cents
    pub amount: i64,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Id,
    pub number: String,
    pub customer_name: String,
    pub status: QuoteStatus,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    /// Total in euro cents
    pub importo: i64,
    /// Set when acceptance generated an invoice
    pub invoice_id: Option<Id>,
    pub notes: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn is_accepted(&self) -> bool {
        self.status == QuoteStatus::Accepted
    }
}

impl Identifiable for Quote {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_invoice(importo: i64, pagato: i64) -> Invoice {
        Invoice {
            id: 1,
            number: "2025/0001".into(),
            customer_name: "ACME Srl".into(),
            customer_vat: Some("IT01234567890".into()),
            status: InvoiceStatus::Issued,
            issue_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            importo,
            totale_pagato: pagato,
            notes: None,
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_within_total_accepted() {
        let invoice = sample_invoice(100_00, 40_00);
        assert!(invoice.validate_payment(60_00).is_ok());
    }

    #[test]
    fn test_payment_exceeding_total_rejected() {
        let invoice = sample_invoice(100_00, 40_00);
        let errors = invoice.validate_payment(61_00).unwrap_err();
        assert!(errors.has_error("amount"));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let invoice = sample_invoice(100_00, 0);
        assert!(invoice.validate_payment(0).is_err());
        assert!(invoice.validate_payment(-5).is_err());
    }

    #[test]
    fn test_derived_status() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            sample_invoice(100_00, 100_00).derived_status(today),
            InvoiceStatus::Paid
        );
        assert_eq!(
            sample_invoice(100_00, 50_00).derived_status(today),
            InvoiceStatus::PartiallyPaid
        );
        // unpaid and past due
        assert_eq!(
            sample_invoice(100_00, 0).derived_status(today),
            InvoiceStatus::Overdue
        );
    }

    #[test]
    fn test_line_totals() {
        let line = InvoiceLine {
            id: 1,
            invoice_id: 1,
            description: "Consulting".into(),
            quantity: 2_50, // 2.5 hours
            unit_price: 80_00,
            vat_rate: 22,
            position: 0,
        };
        assert_eq!(line.net_total(), 200_00);
        assert_eq!(line.gross_total(), 244_00);
    }
}
