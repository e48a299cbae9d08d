//! Warehouse/shipping models: transport documents (DDT)
//!
//! Tables: ddt, ddt_lines
//!
//! DDT is the Italian "Documento Di Trasporto" accompanying shipped goods.

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum DdtStatus {
    Draft,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ddt {
    pub id: Id,
    pub number: String,
    pub customer_name: String,
    pub destination: String,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub status: DdtStatus,
    pub transport_date: NaiveDate,
    /// Optional link to the invoice covering the shipped goods
    pub invoice_id: Option<Id>,
    pub notes: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ddt {
    pub fn is_open(&self) -> bool {
        matches!(self.status, DdtStatus::Draft | DdtStatus::Shipped)
    }
}

impl Identifiable for Ddt {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Ddt {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DdtLine {
    pub id: Id,
    pub ddt_id: Id,
    pub description: String,
    /// Quantity times a hundred (2 decimal places)
    pub quantity: i64,
    pub unit: Option<String>,
    pub position: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_states() {
        let mut ddt = Ddt {
            id: 1,
            number: "DDT-2025-007".into(),
            customer_name: "ACME Srl".into(),
            destination: "Via Roma 1, Milano".into(),
            carrier: Some("BRT".into()),
            tracking_code: None,
            status: DdtStatus::Draft,
            transport_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            invoice_id: None,
            notes: None,
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(ddt.is_open());
        ddt.status = DdtStatus::Delivered;
        assert!(!ddt.is_open());
    }
}
