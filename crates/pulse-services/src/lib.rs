//! # pulse-services
//!
//! Business-rule services sitting between the API handlers and the
//! repositories. Each service validates with `ValidationErrors` before
//! touching the database and returns a `ServiceResult`.

pub mod finance;
pub mod hr;
pub mod result;

pub use result::ServiceResult;
