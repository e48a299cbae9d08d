//! # pulse-core
//!
//! Core types, traits, and utilities for Pulse ERP.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and field-keyed validation errors
//! - Result type aliases
//! - Core traits (Identifiable, Timestamped, SoftDeletable)
//! - Pagination types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use error::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
