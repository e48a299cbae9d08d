//! Note repository
//!
//! Soft-deleted notes never surface in list or search results.

use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::note::Note;
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const NOTE_COLUMNS: &str =
    "id, title, body, color, pinned, owner_id, deleted_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateNote {
    pub title: String,
    pub body: String,
    pub color: Option<String>,
    pub pinned: bool,
    pub owner_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub body: Option<String>,
    pub color: Option<String>,
    pub pinned: Option<bool>,
}

pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Note>> {
        let row = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List the owner's notes, pinned first. `query` filters title and body
    /// case-insensitively when present.
    pub async fn list(
        &self,
        owner_id: Id,
        query: Option<&str>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Note>> {
        let pattern = query.map(|q| format!("%{}%", q));

        let items = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE owner_id = $1 AND deleted_at IS NULL \
               AND ($2::text IS NULL OR title ILIKE $2 OR body ILIKE $2) \
             ORDER BY pinned DESC, updated_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(owner_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notes \
             WHERE owner_id = $1 AND deleted_at IS NULL \
               AND ($2::text IS NULL OR title ILIKE $2 OR body ILIKE $2)",
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create(&self, dto: CreateNote) -> RepositoryResult<Note> {
        let row = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (title, body, color, pinned, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(&dto.color)
        .bind(dto.pinned)
        .bind(dto.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update(&self, id: Id, dto: UpdateNote) -> RepositoryResult<Note> {
        let row = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET \
                 title = COALESCE($1, title), \
                 body = COALESCE($2, body), \
                 color = COALESCE($3, color), \
                 pinned = COALESCE($4, pinned), \
                 updated_at = NOW() \
             WHERE id = $5 AND deleted_at IS NULL \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(&dto.color)
        .bind(dto.pinned)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Note", id))?;

        Ok(row)
    }

    /// Soft delete
    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE notes SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Note", id));
        }

        Ok(())
    }
}
