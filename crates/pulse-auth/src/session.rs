//! In-memory session store
//!
//! Tracks issued tokens per user so an explicit logout (or an admin lock)
//! can invalidate tokens before their JWT expiry.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use pulse_core::traits::Id;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Id,
    pub jti: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Session store with idle timeout
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout_minutes: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::minutes(idle_timeout_minutes as i64),
        }
    }

    pub fn insert(&self, jti: impl Into<String>, user_id: Id) {
        let jti = jti.into();
        let now = Utc::now();
        self.sessions.write().insert(
            jti.clone(),
            Session {
                user_id,
                jti,
                created_at: now,
                last_seen_at: now,
            },
        );
    }

    /// Touch a session, returning false when it is unknown or idle-expired.
    pub fn touch(&self, jti: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(jti) {
            Some(session) if Utc::now() - session.last_seen_at <= self.idle_timeout => {
                session.last_seen_at = Utc::now();
                true
            }
            Some(_) => {
                sessions.remove(jti);
                false
            }
            None => false,
        }
    }

    pub fn remove(&self, jti: &str) -> bool {
        self.sessions.write().remove(jti).is_some()
    }

    /// Drop every session of one user (logout-everywhere, account lock)
    pub fn remove_user(&self, user_id: Id) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_touch() {
        let store = SessionStore::new(30);
        store.insert("jti-1", 1);
        assert!(store.touch("jti-1"));
        assert!(!store.touch("jti-unknown"));
    }

    #[test]
    fn test_remove_user_drops_all_their_sessions() {
        let store = SessionStore::new(30);
        store.insert("a", 1);
        store.insert("b", 1);
        store.insert("c", 2);

        assert_eq!(store.remove_user(1), 2);
        assert_eq!(store.len(), 1);
        assert!(store.touch("c"));
    }

    #[test]
    fn test_idle_timeout_expires_session() {
        // zero-minute timeout expires immediately
        let store = SessionStore::new(0);
        store.insert("jti-1", 1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!store.touch("jti-1"));
        assert!(store.is_empty());
    }
}
