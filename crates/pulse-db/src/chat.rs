//! Chat repositories: channels and messages
//!
//! Channel deletion is hard and cascades to its messages, so a deleted
//! channel disappears from every subsequent list.

use pulse_core::traits::Id;
use pulse_models::chat::{Channel, ChannelKind, ChatMessage};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const CHANNEL_COLUMNS: &str = "id, name, kind, topic, created_by, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, channel_id, sender_id, body, created_at";

#[derive(Debug, Clone)]
pub struct CreateChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<String>,
    pub created_by: Id,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateChannel {
    pub name: Option<String>,
    pub topic: Option<String>,
}

pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_channel(&self, id: Id) -> RepositoryResult<Option<Channel>> {
        let row = sqlx::query_as::<_, Channel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM chat_channels WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_channels(&self) -> RepositoryResult<Vec<Channel>> {
        let rows = sqlx::query_as::<_, Channel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM chat_channels ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_channel(&self, dto: CreateChannel) -> RepositoryResult<Channel> {
        let row = sqlx::query_as::<_, Channel>(&format!(
            "INSERT INTO chat_channels (name, kind, topic, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING {CHANNEL_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.kind)
        .bind(&dto.topic)
        .bind(dto.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// `kind` is immutable after creation; only name and topic change.
    pub async fn update_channel(&self, id: Id, dto: UpdateChannel) -> RepositoryResult<Channel> {
        let row = sqlx::query_as::<_, Channel>(&format!(
            "UPDATE chat_channels SET \
                 name = COALESCE($1, name), \
                 topic = COALESCE($2, topic), \
                 updated_at = NOW() \
             WHERE id = $3 \
             RETURNING {CHANNEL_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.topic)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Channel", id))?;

        Ok(row)
    }

    pub async fn delete_channel(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chat_messages WHERE channel_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM chat_channels WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Channel", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Newest-first page of messages; `before` is an exclusive message-id
    /// cursor for loading history.
    pub async fn list_messages(
        &self,
        channel_id: Id,
        before: Option<Id>,
        limit: i64,
    ) -> RepositoryResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE channel_id = $1 AND ($2::bigint IS NULL OR id < $2) \
             ORDER BY id DESC \
             LIMIT $3"
        ))
        .bind(channel_id)
        .bind(before)
        .bind(limit.clamp(1, 200))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_message(
        &self,
        channel_id: Id,
        sender_id: Id,
        body: &str,
    ) -> RepositoryResult<ChatMessage> {
        let row = sqlx::query_as::<_, ChatMessage>(&format!(
            "INSERT INTO chat_messages (channel_id, sender_id, body, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(channel_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a message the sender owns
    pub async fn delete_message(&self, id: Id, sender_id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = $1 AND sender_id = $2")
            .bind(id)
            .bind(sender_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("ChatMessage", id));
        }

        Ok(())
    }

    pub async fn count_messages_since(
        &self,
        sender_exclude: Id,
        since_hours: i64,
    ) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_messages \
             WHERE sender_id != $1 AND created_at > NOW() - ($2 || ' hours')::interval",
        )
        .bind(sender_exclude)
        .bind(since_hours.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
