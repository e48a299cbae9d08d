//! User account model
//!
//! Table: users

use chrono::{DateTime, Utc};
use pulse_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Invited,
    Locked,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    /// Login name (unique)
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    /// Email address (unique)
    pub email: String,
    pub admin: bool,
    pub status: UserStatus,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub language: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_locked(&self) -> bool {
        self.status == UserStatus::Locked
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        Some(self.id)
    }
}

impl Timestamped for User {
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

    fn sample_user() -> User {
        User {
            id: 1,
            login: "mrossi".into(),
            first_name: "Mario".into(),
            last_name: "Rossi".into(),
            email: "mario.rossi@example.com".into(),
            admin: false,
            status: UserStatus::Active,
            password_hash: None,
            language: Some("it".into()),
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Mario Rossi");
    }

    #[test]
    fn test_locked_user_is_not_active() {
        let mut user = sample_user();
        user.status = UserStatus::Locked;
        assert!(user.is_locked());
        assert!(!user.is_active());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let mut user = sample_user();
        user.password_hash = Some("secret".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"login\":\"mrossi\""));
    }
}
