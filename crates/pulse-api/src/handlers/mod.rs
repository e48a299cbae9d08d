//! API handlers, one module per business module

pub mod auth;
pub mod chat;
pub mod crm;
pub mod dashboard;
pub mod emails;
pub mod finance;
pub mod hr;
pub mod integrations;
pub mod library;
pub mod notes;
pub mod portal;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod warehouse;
