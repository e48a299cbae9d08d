//! Email repositories: accounts and stored messages

use chrono::{DateTime, Utc};
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::email::{EmailAccount, EmailMessage, MailProvider};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const ACCOUNT_COLUMNS: &str = "id, user_id, address, display_name, provider, imap_host, \
     imap_port, smtp_host, smtp_port, credential_ref, last_synced_at, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, account_id, folder, remote_uid, from_address, to_addresses, \
     subject, body_text, body_html, read, sent_at, received_at, created_at";

#[derive(Debug, Clone)]
pub struct CreateEmailAccount {
    pub user_id: Id,
    pub address: String,
    pub display_name: Option<String>,
    pub provider: MailProvider,
    pub imap_host: String,
    pub imap_port: i32,
    pub smtp_host: String,
    pub smtp_port: i32,
    pub credential_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoreEmailMessage {
    pub account_id: Id,
    pub folder: String,
    pub remote_uid: Option<String>,
    pub from_address: String,
    pub to_addresses: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}

pub struct EmailRepository {
    pool: PgPool,
}

impl EmailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_account(&self, id: Id) -> RepositoryResult<Option<EmailAccount>> {
        let row = sqlx::query_as::<_, EmailAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM email_accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_accounts(&self, user_id: Id) -> RepositoryResult<Vec<EmailAccount>> {
        let rows = sqlx::query_as::<_, EmailAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM email_accounts WHERE user_id = $1 ORDER BY address ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_account(&self, dto: CreateEmailAccount) -> RepositoryResult<EmailAccount> {
        let row = sqlx::query_as::<_, EmailAccount>(&format!(
            "INSERT INTO email_accounts (user_id, address, display_name, provider, imap_host, \
                 imap_port, smtp_host, smtp_port, credential_ref, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(dto.user_id)
        .bind(&dto.address)
        .bind(&dto.display_name)
        .bind(dto.provider)
        .bind(&dto.imap_host)
        .bind(dto.imap_port)
        .bind(&dto.smtp_host)
        .bind(dto.smtp_port)
        .bind(&dto.credential_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_account(&self, id: Id, user_id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM email_messages WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM email_accounts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("EmailAccount", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn mark_synced(&self, id: Id) -> RepositoryResult<()> {
        sqlx::query(
            "UPDATE email_accounts SET last_synced_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_message(&self, id: Id) -> RepositoryResult<Option<EmailMessage>> {
        let row = sqlx::query_as::<_, EmailMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM email_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_messages(
        &self,
        account_id: Id,
        folder: &str,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<EmailMessage>> {
        let items = sqlx::query_as::<_, EmailMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM email_messages \
             WHERE account_id = $1 AND folder = $2 \
             ORDER BY received_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(account_id)
        .bind(folder)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM email_messages WHERE account_id = $1 AND folder = $2",
        )
        .bind(account_id)
        .bind(folder)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    /// Store a message fetched from the provider or sent locally. The
    /// `(account_id, folder, remote_uid)` triple is upsert-unique so a
    /// repeated sync never duplicates rows.
    pub async fn store_message(&self, dto: StoreEmailMessage) -> RepositoryResult<EmailMessage> {
        let row = sqlx::query_as::<_, EmailMessage>(&format!(
            "INSERT INTO email_messages (account_id, folder, remote_uid, from_address, \
                 to_addresses, subject, body_text, body_html, read, sent_at, received_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, $9, $10, NOW()) \
             ON CONFLICT (account_id, folder, remote_uid) DO UPDATE SET subject = EXCLUDED.subject \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(dto.account_id)
        .bind(&dto.folder)
        .bind(&dto.remote_uid)
        .bind(&dto.from_address)
        .bind(&dto.to_addresses)
        .bind(&dto.subject)
        .bind(&dto.body_text)
        .bind(&dto.body_html)
        .bind(dto.sent_at)
        .bind(dto.received_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn set_read(&self, id: Id, read: bool) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE email_messages SET read = $1 WHERE id = $2")
            .bind(read)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("EmailMessage", id));
        }

        Ok(())
    }

    pub async fn delete_message(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM email_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("EmailMessage", id));
        }

        Ok(())
    }

    pub async fn count_unread(&self, user_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM email_messages m \
             JOIN email_accounts a ON a.id = m.account_id \
             WHERE a.user_id = $1 AND m.read = false AND m.folder = 'INBOX'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
