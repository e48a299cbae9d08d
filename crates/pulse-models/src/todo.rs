//! To-do module models: projects and tasks
//!
//! Tables: projects, tasks

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::traits::{Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Project grouping tasks
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub owner_id: Id,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// A to-do item, optionally scoped to a project and assigned to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub creator_id: Id,
    pub due_date: Option<NaiveDate>,
    /// Manual ordering within a list
    pub position: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.due_date.map(|d| d < today).unwrap_or(false)
    }
}

impl Identifiable for Task {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl SoftDeletable for Task {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 1,
            title: "Prepare offer".into(),
            description: None,
            status: TaskStatus::Open,
            priority: TaskPriority::Normal,
            project_id: None,
            assignee_id: None,
            creator_id: 1,
            due_date: None,
            position: 0,
            completed_at: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_overdue_requires_past_due_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mut task = sample_task();
        assert!(!task.is_overdue(today));

        task.due_date = Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::Low);
    }
}
