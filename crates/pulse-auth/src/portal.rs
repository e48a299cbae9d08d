//! Customer-portal token helpers
//!
//! Portal tokens are opaque UUIDs bound to a customer name, carried in the
//! `X-Portal-Token` header. Validity rules live on the model; this module
//! only mints values and computes expiries.

use chrono::{DateTime, Duration, Utc};

/// Header carrying the portal token
pub const PORTAL_TOKEN_HEADER: &str = "x-portal-token";

/// Mint a new opaque token value
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Expiry timestamp for a token issued now
pub fn expiry(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_expiry_in_future() {
        assert!(expiry(30) > Utc::now());
    }
}
