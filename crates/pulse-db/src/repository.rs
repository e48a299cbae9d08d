//! Repository trait and shared error type
//!
//! Generic CRUD surface implemented by the per-entity repositories.

use async_trait::async_trait;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &str, id: Id) -> Self {
        Self::NotFound(format!("{} with id {} not found", entity, id))
    }
}

/// Base repository trait for uniform CRUD entities
#[async_trait]
pub trait Repository<T, CreateDto, UpdateDto>: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>>;

    async fn list(&self, pagination: Pagination) -> RepositoryResult<Paginated<T>>;

    async fn create(&self, dto: CreateDto) -> RepositoryResult<T>;

    async fn update(&self, id: Id, dto: UpdateDto) -> RepositoryResult<T>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}
