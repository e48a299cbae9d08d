//! # pulse-db
//!
//! Database layer for Pulse ERP: connection pool plus one repository per
//! business entity. Repositories take a cloned `PgPool` and return the
//! domain models from `pulse-models` directly via `sqlx::FromRow`.

pub mod chat;
pub mod crm;
pub mod dashboard;
pub mod emails;
pub mod finance;
pub mod hr;
pub mod library;
pub mod notes;
pub mod pool;
pub mod portal;
pub mod projects;
pub mod repository;
pub mod tasks;
pub mod users;
pub mod warehouse;

pub use pool::{Database, DatabaseConfig};
pub use repository::{Repository, RepositoryError, RepositoryResult};
