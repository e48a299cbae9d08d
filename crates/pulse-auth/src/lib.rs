//! # pulse-auth
//!
//! Authentication for Pulse ERP: JWT issuing/validation, argon2 password
//! hashing, in-memory sessions, the request-scoped user context, and
//! customer-portal tokens.

pub mod context;
pub mod jwt;
pub mod password;
pub mod portal;
pub mod session;

pub use context::CurrentUser;
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
