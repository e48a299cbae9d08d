//! API error handling
//!
//! Every layer error funnels into `ApiError`, which renders a JSON body
//! with a stable machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulse_core::error::ValidationErrors;
use pulse_db::repository::RepositoryError;
use pulse_integrations::{AiError, CalendarError, WhatsAppError};
use serde::Serialize;
use std::collections::HashMap;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Upstream { service: &'static str, message: String },
    NotConfigured(&'static str),
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(errors) => ErrorBody {
                error: self.code(),
                message: errors.full_messages().join(", "),
                fields: Some(errors.errors.clone()),
            },
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => ErrorBody {
                error: self.code(),
                message: msg.clone(),
                fields: None,
            },
            ApiError::Upstream { service, message } => ErrorBody {
                error: self.code(),
                message: format!("{}: {}", service, message),
                fields: None,
            },
            ApiError::NotConfigured(what) => ErrorBody {
                error: self.code(),
                message: format!("{} integration is not configured", what),
                fields: None,
            },
        };

        if status.is_server_error() {
            tracing::error!(status = %status, message = %body.message, "API error");
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ApiError::Internal("database error".into())
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = ValidationErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", error.code));
                out.add(field.to_string(), message);
            }
        }
        ApiError::Validation(out)
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured => ApiError::NotConfigured("AI"),
            other => ApiError::Upstream {
                service: "ai",
                message: other.to_string(),
            },
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        ApiError::Upstream {
            service: "calendar",
            message: err.to_string(),
        }
    }
}

impl From<WhatsAppError> for ApiError {
    fn from(err: WhatsAppError) -> Self {
        match err {
            WhatsAppError::NoSession(user) => {
                ApiError::not_found("WhatsAppSession", user)
            }
            WhatsAppError::NotReady(state) => {
                ApiError::Conflict(format!("session is not ready: {}", state))
            }
            other => ApiError::Upstream {
                service: "whatsapp",
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("Invoice", 1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation(ValidationErrors::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::NotConfigured("AI").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::Conflict("no copies".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_ai_error_conversion() {
        let err: ApiError = AiError::Status(500).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError = AiError::NotConfigured.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
