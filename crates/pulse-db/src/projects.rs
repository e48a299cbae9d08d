//! Project repository

use async_trait::async_trait;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::todo::Project;
use sqlx::PgPool;

use crate::repository::{Repository, RepositoryError, RepositoryResult};

const PROJECT_COLUMNS: &str =
    "id, name, description, color, owner_id, archived, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub owner_id: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub archived: Option<bool>,
}

pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active (non-archived) projects, unpaginated for sidebar listings
    pub async fn find_active(&self) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE archived = false ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl Repository<Project, CreateProject, UpdateProject> for ProjectRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, pagination: Pagination) -> RepositoryResult<Paginated<Project>> {
        let items = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name ASC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    async fn create(&self, dto: CreateProject) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, description, color, owner_id, archived, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, false, NOW(), NOW()) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.color)
        .bind(dto.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateProject) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET \
                 name = COALESCE($1, name), \
                 description = COALESCE($2, description), \
                 color = COALESCE($3, color), \
                 archived = COALESCE($4, archived), \
                 updated_at = NOW() \
             WHERE id = $5 \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.color)
        .bind(dto.archived)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Project", id))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Project", id));
        }

        Ok(())
    }
}
