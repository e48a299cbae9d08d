//! CRM module models: leads and opportunities
//!
//! Tables: leads, opportunities

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Lost,
    Converted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Id,
    pub company: String,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub owner_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Terminal states cannot move back into the pipeline
    pub fn is_closed(&self) -> bool {
        matches!(self.status, LeadStatus::Lost | LeadStatus::Converted)
    }
}

impl Identifiable for Lead {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum OpportunityStage {
    Prospecting,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Id,
    pub title: String,
    pub lead_id: Option<Id>,
    pub stage: OpportunityStage,
    /// Expected deal value in euro cents
    pub amount: i64,
    /// Win probability, 0-100
    pub probability: i32,
    pub expected_close: Option<NaiveDate>,
    pub owner_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    /// Probability-weighted value in euro cents
    pub fn weighted_amount(&self) -> i64 {
        self.amount * i64::from(self.probability.clamp(0, 100)) / 100
    }
}

impl Identifiable for Opportunity {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Lead {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_lead_states() {
        let mut lead = Lead {
            id: 1,
            company: "ACME Srl".into(),
            contact_name: "L. Bianchi".into(),
            email: None,
            phone: None,
            source: None,
            status: LeadStatus::New,
            notes: None,
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!lead.is_closed());
        lead.status = LeadStatus::Converted;
        assert!(lead.is_closed());
    }

    #[test]
    fn test_weighted_amount() {
        let opp = Opportunity {
            id: 1,
            title: "Website renewal".into(),
            lead_id: None,
            stage: OpportunityStage::Proposal,
            amount: 10_000_00,
            probability: 40,
            expected_close: None,
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(opp.weighted_amount(), 4_000_00);
    }

    #[test]
    fn test_weighted_amount_clamps_probability() {
        let opp = Opportunity {
            id: 1,
            title: "t".into(),
            lead_id: None,
            stage: OpportunityStage::Won,
            amount: 100,
            probability: 250,
            expected_close: None,
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(opp.weighted_amount(), 100);
    }
}
