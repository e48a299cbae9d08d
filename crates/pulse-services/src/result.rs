//! Service result type

use pulse_core::error::ValidationErrors;

/// Outcome of a service call: a value on success, field-keyed validation
/// errors on failure.
#[derive(Debug)]
pub struct ServiceResult<T> {
    success: bool,
    result: Option<T>,
    errors: ValidationErrors,
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
            message: None,
        }
    }

    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(result)
        }
    }

    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            result: None,
            errors,
            message: None,
        }
    }

    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(ValidationErrors::single(field, message))
    }

    pub fn failure_with_base_error(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<T> {
        self.result.take()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Convert into a plain Result, dropping the message
    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match self.result {
            Some(value) if self.success => Ok(value),
            _ => Err(self.errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
        assert_eq!(result.into_result().unwrap(), 42);
    }

    #[test]
    fn test_failure() {
        let result: ServiceResult<()> = ServiceResult::failure_with_error("amount", "too large");
        assert!(result.is_failure());
        assert!(result.errors().has_error("amount"));
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_message() {
        let result = ServiceResult::success_with_message(1, "created");
        assert_eq!(result.message(), Some("created"));
    }
}
