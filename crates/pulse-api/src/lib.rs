//! # pulse-api
//!
//! REST layer for Pulse ERP: application state, extractors, error mapping,
//! and the `/api` router with one handler module per business module.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
