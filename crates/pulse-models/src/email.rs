//! Email module models: accounts and stored messages
//!
//! Tables: email_accounts, email_messages

use chrono::{DateTime, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Known provider presets. `Custom` means the user supplied host/port pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum MailProvider {
    Gmail,
    Outlook,
    Aruba,
    /// Aruba certified mail (PEC)
    ArubaPec,
    Libero,
    Custom,
}

/// A configured mailbox belonging to one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailAccount {
    pub id: Id,
    pub user_id: Id,
    pub address: String,
    pub display_name: Option<String>,
    pub provider: MailProvider,
    pub imap_host: String,
    pub imap_port: i32,
    pub smtp_host: String,
    pub smtp_port: i32,
    /// Credential reference; never the password itself
    #[serde(skip_serializing)]
    pub credential_ref: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for EmailAccount {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

/// A stored message envelope + body
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: Id,
    pub account_id: Id,
    pub folder: String,
    /// Provider-side unique id within the folder
    pub remote_uid: Option<String>,
    pub from_address: String,
    pub to_addresses: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub read: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for EmailMessage {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for EmailAccount {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serialization() {
        assert_eq!(
            serde_json::to_string(&MailProvider::ArubaPec).unwrap(),
            "\"aruba_pec\""
        );
    }

    #[test]
    fn test_credential_ref_not_serialized() {
        let account = EmailAccount {
            id: 1,
            user_id: 1,
            address: "ufficio@example.it".into(),
            display_name: None,
            provider: MailProvider::Aruba,
            imap_host: "imaps.aruba.it".into(),
            imap_port: 993,
            smtp_host: "smtps.aruba.it".into(),
            smtp_port: 465,
            credential_ref: Some("vault:1234".into()),
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("vault:1234"));
    }
}
