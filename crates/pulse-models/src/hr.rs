//! HR module models: employees, shifts, parsed payslips
//!
//! Tables: employees, shifts

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::error::ValidationErrors;
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Id,
    /// Linked login account, when the employee uses the system
    pub user_id: Option<Id>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub hired_on: NaiveDate,
    pub terminated_on: Option<NaiveDate>,
    pub hourly_cost: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn is_employed(&self) -> bool {
        self.terminated_on.is_none()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Identifiable for Employee {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Employee {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

/// A planned work shift
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Id,
    pub employee_id: Id,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    /// A shift must end after it starts.
    pub fn validate_times(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), ValidationErrors> {
        if ends_at <= starts_at {
            return Err(ValidationErrors::single("endsAt", "must be after startsAt"));
        }
        Ok(())
    }

    /// Half-open interval overlap check against another shift
    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.starts_at < other_end && other_start < self.ends_at
    }
}

impl Identifiable for Shift {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

/// Structured fields extracted from a payslip (cedolino) by the AI adapter.
/// Not persisted; returned to the caller for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipData {
    pub employee_name: String,
    /// Period in "YYYY-MM" form
    pub period: String,
    /// Gross pay in euro cents
    pub gross: i64,
    /// Net pay in euro cents
    pub net: i64,
    pub company: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, h, 0, 0).unwrap()
    }

    fn shift(start_h: u32, end_h: u32) -> Shift {
        Shift {
            id: 1,
            employee_id: 1,
            starts_at: ts(start_h),
            ends_at: ts(end_h),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_times_must_be_ordered() {
        assert!(Shift::validate_times(ts(9), ts(17)).is_ok());
        assert!(Shift::validate_times(ts(17), ts(9)).is_err());
        assert!(Shift::validate_times(ts(9), ts(9)).is_err());
    }

    #[test]
    fn test_overlap() {
        let existing = shift(9, 13);
        assert!(existing.overlaps(ts(12), ts(15)));
        assert!(existing.overlaps(ts(8), ts(10)));
        // back-to-back shifts do not overlap
        assert!(!existing.overlaps(ts(13), ts(17)));
        assert!(!existing.overlaps(ts(6), ts(9)));
    }
}
