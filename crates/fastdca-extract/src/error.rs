//! Extraction error types.

use fastdca_core::{ErrorCategory, ErrorDetail, ErrorEnvelope, FieldErrors, InjectionError};
use http::StatusCode;
use std::fmt;

/// Where the extractor was reading from when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path parameters (e.g., `/blog/{id}`)
    Path,
    /// Query string parameters
    Query,
    /// Request body
    Body,
    /// Content-Type header
    ContentType,
    /// The service container
    Container,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// Error that occurs during extraction.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing(ExtractionSource::Query, "username");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert!(err.to_string().contains("username"));
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    field_errors: Option<FieldErrors>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    Missing,
    InvalidType,
    ValidationFailed,
    DeserializationFailed,
    PayloadTooLarge,
    UnsupportedMediaType,
    Injection,
}

impl ExtractionError {
    fn build(
        source: ExtractionSource,
        kind: ExtractionErrorKind,
        field: Option<String>,
        message: String,
    ) -> Self {
        Self {
            extraction_source: source,
            kind,
            field,
            field_errors: None,
            message,
        }
    }

    /// Creates an error for a missing field or parameter.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("missing required {source} parameter: {field}");
        Self::build(source, ExtractionErrorKind::Missing, Some(field), message)
    }

    /// Creates an error for a value that cannot be parsed as the expected type.
    #[must_use]
    pub fn invalid_type(
        source: ExtractionSource,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let message = format!("invalid {source} parameter '{field}': {}", details.into());
        Self::build(source, ExtractionErrorKind::InvalidType, Some(field), message)
    }

    /// Creates an error for a model whose fields failed validation.
    #[must_use]
    pub fn invalid_fields(source: ExtractionSource, field_errors: FieldErrors) -> Self {
        let count = field_errors.len();
        let plural = if count == 1 { "" } else { "s" };
        let mut err = Self::build(
            source,
            ExtractionErrorKind::ValidationFailed,
            None,
            format!("{count} validation error{plural} in {source}"),
        );
        err.field_errors = Some(field_errors);
        err
    }

    /// Creates an error for deserialization failure.
    #[must_use]
    pub fn deserialization_failed(source: ExtractionSource, error: impl Into<String>) -> Self {
        let message = format!("failed to deserialize {source}: {}", error.into());
        Self::build(source, ExtractionErrorKind::DeserializationFailed, None, message)
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self::build(
            ExtractionSource::Body,
            ExtractionErrorKind::PayloadTooLarge,
            None,
            format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
        )
    }

    /// Creates an error for unsupported content type.
    #[must_use]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self::build(
            ExtractionSource::ContentType,
            ExtractionErrorKind::UnsupportedMediaType,
            None,
            format!("unsupported content type: expected '{expected}', got '{actual}'"),
        )
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns per-field validation messages, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::InvalidType
            | ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::Injection => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::InvalidType => "INVALID_PARAMETER",
            ExtractionErrorKind::ValidationFailed => "VALIDATION_ERROR",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ExtractionErrorKind::Injection => "INJECTION_FAILED",
        }
    }

    /// Returns the broad category, used for the envelope `category` field.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ExtractionErrorKind::ValidationFailed => ErrorCategory::Validation,
            ExtractionErrorKind::Injection => ErrorCategory::Internal,
            _ => ErrorCategory::BadRequest,
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Field errors, when present, become the envelope `details`.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let details = match (&self.field_errors, &self.field) {
            (Some(errors), _) => serde_json::to_value(errors).ok(),
            (None, Some(field)) => Some(serde_json::json!({
                "source": self.extraction_source.to_string(),
                "field": field,
            })),
            (None, None) => None,
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.message.clone(),
                category: self.category(),
                details,
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<InjectionError> for ExtractionError {
    fn from(err: InjectionError) -> Self {
        Self::build(
            ExtractionSource::Container,
            ExtractionErrorKind::Injection,
            Some(err.type_name.to_string()),
            err.to_string(),
        )
    }
}
