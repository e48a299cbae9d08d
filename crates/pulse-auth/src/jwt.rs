//! JWT authentication

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// JWT ID (for token revocation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// User login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Admin flag
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn create_token(
        &self,
        user_id: i64,
        login: Option<String>,
        admin: bool,
        expires_in_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + expires_in_seconds as usize,
            iat: now,
            jti: Some(uuid::Uuid::new_v4().to_string()),
            login,
            admin,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    pub fn user_id(&self, token: &str) -> Result<i64, JwtError> {
        let claims = self.validate_token(token)?;
        claims
            .sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))
    }
}

/// Extract bearer token from an Authorization header value
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    if authorization.to_lowercase().starts_with("bearer ") {
        Some(authorization[7..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes");

        let token = service
            .create_token(1, Some("mrossi".into()), false, 3600)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.login, Some("mrossi".into()));
        assert!(!claims.admin);
    }

    #[test]
    fn test_admin_claim_round_trips() {
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes");
        let token = service.create_token(2, None, true, 3600).unwrap();
        assert!(service.validate_token(&token).unwrap().admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes");
        let other = JwtService::new(b"another-secret-key-at-least-32-b");

        let token = service.create_token(1, None, false, 3600).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }

    #[test]
    fn test_user_id() {
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes");
        let token = service.create_token(42, None, false, 3600).unwrap();
        assert_eq!(service.user_id(&token).unwrap(), 42);
    }
}
