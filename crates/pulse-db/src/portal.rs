//! Portal token repository

use chrono::{DateTime, Utc};
use pulse_core::traits::Id;
use pulse_models::portal::PortalToken;
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const TOKEN_COLUMNS: &str =
    "id, token, customer_name, expires_at, revoked_at, created_by, created_at";

pub struct PortalRepository {
    pool: PgPool,
}

impl PortalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        token: &str,
        customer_name: &str,
        expires_at: DateTime<Utc>,
        created_by: Id,
    ) -> RepositoryResult<PortalToken> {
        let row = sqlx::query_as::<_, PortalToken>(&format!(
            "INSERT INTO portal_tokens (token, customer_name, expires_at, created_by, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(token)
        .bind(customer_name)
        .bind(expires_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Look up by opaque token value. Validity (expiry, revocation) is the
    /// caller's check; this is a plain fetch.
    pub async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<PortalToken>> {
        let row = sqlx::query_as::<_, PortalToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM portal_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(&self) -> RepositoryResult<Vec<PortalToken>> {
        let rows = sqlx::query_as::<_, PortalToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM portal_tokens ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn revoke(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE portal_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("PortalToken", id));
        }

        Ok(())
    }
}
