//! Library module models: books and loans
//!
//! Tables: books, book_loans

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Id,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub shelf: Option<String>,
    /// Total copies owned
    pub copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Copies not currently lent out. Never negative.
    pub fn available(&self, open_loans: i64) -> i64 {
        (i64::from(self.copies) - open_loans).max(0)
    }
}

impl Identifiable for Book {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Book {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookLoan {
    pub id: Id,
    pub book_id: Id,
    pub borrower_id: Id,
    pub loaned_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub returned_on: Option<NaiveDate>,
}

impl BookLoan {
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_never_negative() {
        let book = Book {
            id: 1,
            title: "The Rust Programming Language".into(),
            author: "Klabnik & Nichols".into(),
            isbn: None,
            shelf: None,
            copies: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(book.available(0), 2);
        assert_eq!(book.available(2), 0);
        // over-lent data never reports negative availability
        assert_eq!(book.available(3), 0);
    }
}
