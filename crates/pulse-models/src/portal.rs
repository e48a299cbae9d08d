//! Customer portal models
//!
//! Table: portal_tokens

use chrono::{DateTime, Utc};
use pulse_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Access token granting a customer read access to their documents.
/// Carried by the `X-Portal-Token` header.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PortalToken {
    pub id: Id,
    /// Opaque token value (UUID)
    #[serde(skip_serializing)]
    pub token: String,
    /// Customer name as it appears on invoices and DDT
    pub customer_name: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_by: Id,
    pub created_at: DateTime<Utc>,
}

impl PortalToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

impl Identifiable for PortalToken {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in_days: i64) -> PortalToken {
        PortalToken {
            id: 1,
            token: "t".into(),
            customer_name: "ACME Srl".into(),
            expires_at: Utc::now() + Duration::days(expires_in_days),
            revoked_at: None,
            created_by: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expired_token_invalid() {
        assert!(token(30).is_valid(Utc::now()));
        assert!(!token(-1).is_valid(Utc::now()));
    }

    #[test]
    fn test_revoked_token_invalid() {
        let mut t = token(30);
        t.revoked_at = Some(Utc::now());
        assert!(!t.is_valid(Utc::now()));
    }

    #[test]
    fn test_token_value_not_serialized() {
        let t = token(30);
        let json = serde_json::to_string(&t).unwrap();
        assert!(!json.contains("\"token\""));
    }
}
