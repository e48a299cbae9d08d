//! Notes module model
//!
//! Table: notes

use chrono::{DateTime, Utc};
use pulse_core::traits::{Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A free-form note with color and pin flag
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub color: Option<String>,
    pub pinned: bool,
    pub owner_id: Id,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Note {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Note {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl SoftDeletable for Note {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
