//! Request-scoped user context

use pulse_core::traits::Id;
use serde::Serialize;

/// The authenticated principal attached to a request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Id,
    pub login: String,
    pub admin: bool,
}

impl CurrentUser {
    pub fn new(id: Id, login: impl Into<String>, admin: bool) -> Self {
        Self {
            id,
            login: login.into(),
            admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_flag() {
        assert!(CurrentUser::new(1, "root", true).is_admin());
        assert!(!CurrentUser::new(2, "mrossi", false).is_admin());
    }
}
