//! # pulse-models
//!
//! Domain models for Pulse ERP.
//!
//! Every business module has its own file: entities derive `sqlx::FromRow`
//! so the repositories in `pulse-db` read them directly, and status enums
//! derive `sqlx::Type` backed by text columns.
//!
//! Monetary amounts are integer euro cents throughout.

pub mod chat;
pub mod crm;
pub mod email;
pub mod finance;
pub mod hr;
pub mod library;
pub mod note;
pub mod portal;
pub mod todo;
pub mod user;
pub mod warehouse;

pub use chat::*;
pub use crm::*;
pub use email::*;
pub use finance::*;
pub use hr::*;
pub use library::*;
pub use note::*;
pub use portal::*;
pub use todo::*;
pub use user::*;
pub use warehouse::*;
