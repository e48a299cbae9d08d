//! Chat module models: channels and messages
//!
//! Tables: chat_channels, chat_messages

use chrono::{DateTime, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Channel kind. A channel belongs to exactly one kind for its whole
/// lifetime; the column is immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum ChannelKind {
    /// One-to-one conversation
    Direct,
    /// Multi-member group
    Group,
    /// Read-mostly broadcast channel
    Announcement,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Id,
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<String>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Channel {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Id,
    pub channel_id: Id,
    pub sender_id: Id,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ChatMessage {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for ChatMessage {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ChannelKind::Announcement).unwrap(),
            "\"announcement\""
        );
        let kind: ChannelKind = serde_json::from_str("\"direct\"").unwrap();
        assert_eq!(kind, ChannelKind::Direct);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(serde_json::from_str::<ChannelKind>("\"broadcast\"").is_err());
    }
}
