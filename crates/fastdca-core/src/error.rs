//! Application error types.
//!
//! [`AppError`] is the error every handler and dependency eventually reports.
//! Each variant belongs to an [`ErrorCategory`], and the category decides the
//! HTTP status and the machine-readable code written into the
//! [`ErrorEnvelope`] returned to clients.
//!
//! | `ErrorCategory` | Status | Code |
//! |---|---|---|
//! | `BadRequest` | 400 | `BAD_REQUEST` |
//! | `Validation` | 422 | `VALIDATION_ERROR` |
//! | `NotFound` | 404 | `RESOURCE_NOT_FOUND` |
//! | `Timeout` | 504 | `TIMEOUT` |
//! | `Internal` | 500 | `INTERNAL_ERROR` |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed request (unparseable path or query values).
    BadRequest,
    /// Well-formed request whose content failed model validation.
    Validation,
    /// The requested resource does not exist.
    NotFound,
    /// The request took too long.
    Timeout,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable code used in error envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "RESOURCE_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Standard error type for FastDCA handlers and dependencies.
///
/// # Example
///
/// ```
/// use fastdca_core::{AppError, ErrorCategory};
///
/// fn check_name(name: &str) -> Result<(), AppError> {
///     if name.is_empty() {
///         return Err(AppError::validation("name must not be empty"));
///     }
///     Ok(())
/// }
///
/// let err = check_name("").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The request could not be interpreted.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Request content failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message, returned to the client verbatim.
        message: String,
        /// The identifier that missed.
        resource_id: Option<String>,
    },

    /// Request timeout.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl AppError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_id: None,
        }
    }

    /// Creates a not found error that records the missing identifier.
    #[must_use]
    pub fn not_found_id(message: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_id: Some(resource_id.into()),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } => ErrorCategory::BadRequest,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the client-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Timeout { message }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.category().code().to_string(),
                message: self.message().to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                field_errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            Self::NotFound {
                resource_id: Some(id),
                ..
            } => Some(serde_json::json!({ "resource_id": id })),
            _ => None,
        }
    }
}

/// Field-specific validation errors.
///
/// Fields are kept sorted so that envelopes serialize deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_422() {
        let error = AppError::validation("email is invalid");
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error.to_string().contains("email is invalid"));
    }

    #[test]
    fn test_validation_envelope_carries_fields() {
        let mut field_errors = FieldErrors::new();
        field_errors.add("email", "must contain '@'");
        field_errors.add("name", "must not be empty");

        let error = AppError::validation_with_fields("1 validation error for User", field_errors);
        let envelope = error.to_envelope(Some("req-1"));
        let details = envelope.error.details.expect("details");
        assert_eq!(details["fields"]["email"][0], "must contain '@'");
        assert_eq!(envelope.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_not_found_envelope_uses_raw_message() {
        let error = AppError::not_found_id("Object ID 99 not found", "99");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.message(), "Object ID 99 not found");

        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.message, "Object ID 99 not found");
        assert_eq!(envelope.error.code, "RESOURCE_NOT_FOUND");
        assert_eq!(envelope.error.details.unwrap()["resource_id"], "99");
    }

    #[test]
    fn test_envelope_serialization() {
        let error = AppError::not_found("gone");
        let json = serde_json::to_string(&error.to_envelope(Some("req-456"))).unwrap();
        assert!(json.contains("\"code\":\"RESOURCE_NOT_FOUND\""));
        assert!(json.contains("\"category\":\"not_found\""));
        assert!(json.contains("\"request_id\":\"req-456\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_internal_error_keeps_source() {
        let error = AppError::internal_with_source("boom", anyhow::anyhow!("disk full"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("id", "Input should be a valid integer");
        errors.add("id", "Field required");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("id").map(<[String]>::len), Some(2));
        assert!(errors.get("age").is_none());
    }

    #[test]
    fn test_all_error_categories_have_error_status_codes() {
        let categories = [
            ErrorCategory::BadRequest,
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::Timeout,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
