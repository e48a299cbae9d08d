//! Core error types for Pulse ERP
//!
//! Every layer maps into `PulseError` at its boundary; the API layer turns it
//! into an HTTP response via `status_code`/`error_code`.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all Pulse ERP operations
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

impl PulseError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PulseError::NotFound { .. } => 404,
            PulseError::Unauthorized { .. } => 401,
            PulseError::Forbidden { .. } => 403,
            PulseError::Validation(_) => 422,
            PulseError::Conflict { .. } => 409,
            PulseError::Database(_) | PulseError::Internal(_) | PulseError::Config(_) => 500,
            PulseError::ExternalService { .. } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PulseError::NotFound { .. } => "not_found",
            PulseError::Unauthorized { .. } => "unauthorized",
            PulseError::Forbidden { .. } => "forbidden",
            PulseError::Validation(_) => "validation_failed",
            PulseError::Database(_) => "database_error",
            PulseError::Internal(_) => "internal_error",
            PulseError::Config(_) => "configuration_error",
            PulseError::ExternalService { .. } => "external_service_error",
            PulseError::Conflict { .. } => "conflict",
        }
    }
}

/// Field-keyed validation errors collected across a request
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single field error
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("importo", "must be positive");
        errors.add("importo", "must be set");
        errors.add_base("invoice is locked");

        assert!(errors.has_error("importo"));
        assert_eq!(errors.get("importo").unwrap().len(), 2);
        assert_eq!(errors.full_messages().len(), 3);
    }

    #[test]
    fn test_validation_errors_merge() {
        let mut a = ValidationErrors::single("title", "is required");
        let b = ValidationErrors::single("title", "is too short");
        a.merge(b);
        assert_eq!(a.get("title").unwrap().len(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PulseError::not_found("Invoice", "id", 7).status_code(),
            404
        );
        assert_eq!(
            PulseError::Validation(ValidationErrors::new()).status_code(),
            422
        );
        assert_eq!(PulseError::external("openai", "timeout").status_code(), 502);
        assert_eq!(PulseError::external("openai", "timeout").error_code(), "external_service_error");
    }
}
