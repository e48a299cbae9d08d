//! Task repository
//!
//! Tasks are soft-deleted: every read filters `deleted_at IS NULL`.

use chrono::NaiveDate;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::todo::{Task, TaskPriority, TaskStatus};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const TASK_COLUMNS: &str = "id, title, description, status, priority, project_id, assignee_id, \
     creator_id, due_date, position, completed_at, deleted_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub creator_id: Id,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub due_date: Option<NaiveDate>,
    pub position: Option<i32>,
}

/// List filters; all optional and combinable
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub status: Option<TaskStatus>,
}

pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(
        &self,
        filter: TaskFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Task>> {
        let items = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE deleted_at IS NULL \
               AND ($1::bigint IS NULL OR project_id = $1) \
               AND ($2::bigint IS NULL OR assignee_id = $2) \
               AND ($3::text IS NULL OR status = $3) \
             ORDER BY position ASC, created_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.project_id)
        .bind(filter.assignee_id)
        .bind(filter.status)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks \
             WHERE deleted_at IS NULL \
               AND ($1::bigint IS NULL OR project_id = $1) \
               AND ($2::bigint IS NULL OR assignee_id = $2) \
               AND ($3::text IS NULL OR status = $3)",
        )
        .bind(filter.project_id)
        .bind(filter.assignee_id)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create(&self, dto: CreateTask) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, status, priority, project_id, assignee_id, \
                 creator_id, due_date, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 COALESCE((SELECT MAX(position) + 1 FROM tasks WHERE deleted_at IS NULL), 0), \
                 NOW(), NOW()) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(TaskStatus::Open)
        .bind(dto.priority)
        .bind(dto.project_id)
        .bind(dto.assignee_id)
        .bind(dto.creator_id)
        .bind(dto.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update(&self, id: Id, dto: UpdateTask) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET \
                 title = COALESCE($1, title), \
                 description = COALESCE($2, description), \
                 priority = COALESCE($3, priority), \
                 project_id = COALESCE($4, project_id), \
                 assignee_id = COALESCE($5, assignee_id), \
                 due_date = COALESCE($6, due_date), \
                 position = COALESCE($7, position), \
                 updated_at = NOW() \
             WHERE id = $8 AND deleted_at IS NULL \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.priority)
        .bind(dto.project_id)
        .bind(dto.assignee_id)
        .bind(dto.due_date)
        .bind(dto.position)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Task", id))?;

        Ok(row)
    }

    /// Move a task through its lifecycle. Completing stamps `completed_at`,
    /// reopening clears it.
    pub async fn set_status(&self, id: Id, status: TaskStatus) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET \
                 status = $1, \
                 completed_at = CASE WHEN $1 = 'done' THEN NOW() ELSE NULL END, \
                 updated_at = NOW() \
             WHERE id = $2 AND deleted_at IS NULL \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Task", id))?;

        Ok(row)
    }

    /// Soft delete
    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE tasks SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Task", id));
        }

        Ok(())
    }

    pub async fn count_open(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE deleted_at IS NULL AND status != 'done'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
