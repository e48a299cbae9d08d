//! User repository

use async_trait::async_trait;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::user::{User, UserStatus};
use sqlx::PgPool;

use crate::repository::{Repository, RepositoryError, RepositoryResult};

const USER_COLUMNS: &str = "id, login, first_name, last_name, email, admin, status, \
     password_hash, language, last_login_at, created_at, updated_at";

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub admin: bool,
    pub status: UserStatus,
    pub password_hash: Option<String>,
    pub language: Option<String>,
}

/// DTO for updating a user; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
    pub status: Option<UserStatus>,
    pub password_hash: Option<String>,
    pub language: Option<String>,
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_login(&self, login: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login = $1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_last_login(&self, id: Id) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn is_login_unique(
        &self,
        login: &str,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<bool> {
        let unique = sqlx::query_scalar::<_, bool>(
            "SELECT NOT EXISTS(SELECT 1 FROM users WHERE login = $1 AND ($2::bigint IS NULL OR id != $2))",
        )
        .bind(login)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(unique)
    }

    pub async fn is_email_unique(
        &self,
        email: &str,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<bool> {
        let unique = sqlx::query_scalar::<_, bool>(
            "SELECT NOT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::bigint IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(unique)
    }
}

#[async_trait]
impl Repository<User, CreateUser, UpdateUser> for UserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, pagination: Pagination) -> RepositoryResult<Paginated<User>> {
        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY login ASC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    async fn create(&self, dto: CreateUser) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (login, first_name, last_name, email, admin, status, \
                 password_hash, language, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.login)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(dto.admin)
        .bind(dto.status)
        .bind(&dto.password_hash)
        .bind(&dto.language)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateUser) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 login = COALESCE($1, login), \
                 first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 email = COALESCE($4, email), \
                 admin = COALESCE($5, admin), \
                 status = COALESCE($6, status), \
                 password_hash = COALESCE($7, password_hash), \
                 language = COALESCE($8, language), \
                 updated_at = NOW() \
             WHERE id = $9 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.login)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(dto.admin)
        .bind(dto.status)
        .bind(&dto.password_hash)
        .bind(&dto.language)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("User", id));
        }

        Ok(())
    }
}
