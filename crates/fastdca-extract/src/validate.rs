//! Data-model validation.
//!
//! A [`Model`] is built from an untyped JSON value field by field, so that
//! every bad field is reported at once instead of stopping at the first
//! serde error. [`FieldReader`] does the bookkeeping, value rules are
//! declared with `validator`'s `#[derive(Validate)]`, and [`Valid<T>`]
//! exposes the result as a request-body extractor that answers 422.
//!
//! # Example
//!
//! ```rust
//! use fastdca_core::FieldErrors;
//! use fastdca_extract::{FieldReader, Model};
//! use serde_json::json;
//!
//! #[derive(Debug)]
//! struct Item {
//!     name: String,
//!     price: f64,
//! }
//!
//! impl Model for Item {
//!     const NAME: &'static str = "Item";
//!
//!     fn from_value(value: &serde_json::Value) -> Result<Self, FieldErrors> {
//!         let mut fields = FieldReader::new(value);
//!         let name = fields.required::<String>("name");
//!         let price = fields.required::<f64>("price");
//!         match (name, price, fields.into_errors()) {
//!             (Some(name), Some(price), errors) if errors.is_empty() => Ok(Item { name, price }),
//!             (.., errors) => Err(errors),
//!         }
//!     }
//! }
//!
//! let err = Item::parse(&json!({"name": "pen", "price": "cheap"})).unwrap_err();
//! assert_eq!(err.errors().len(), 1);
//! assert!(err.to_string().starts_with("1 validation error for Item"));
//! ```

use crate::json::checked_body;
use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use fastdca_core::{AppError, FieldErrors};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Field name used for errors that concern the whole input.
pub const ROOT_FIELD: &str = "__root__";

/// A typed model that validates untyped JSON input.
pub trait Model: Sized {
    /// Name used in validation error messages.
    const NAME: &'static str;

    /// Builds the model, collecting every field error.
    fn from_value(value: &Value) -> Result<Self, FieldErrors>;

    /// Like [`from_value`](Self::from_value), tagging errors with the model name.
    fn parse(value: &Value) -> Result<Self, ModelValidationError> {
        Self::from_value(value).map_err(|errors| ModelValidationError::new(Self::NAME, errors))
    }
}

/// Validation failure for a whole model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ModelValidationError {
    model: &'static str,
    errors: FieldErrors,
}

impl ModelValidationError {
    /// Creates a validation error for the named model.
    #[must_use]
    pub fn new(model: &'static str, errors: FieldErrors) -> Self {
        Self { model, errors }
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Returns the per-field messages.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}

/// Lists one field per line, with each message indented beneath it.
impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self.errors.fields.values().map(Vec::len).sum();
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "{count} validation error{plural} for {}", self.model)?;
        for (field, messages) in &self.errors.fields {
            write!(f, "\n{field}")?;
            for message in messages {
                write!(f, "\n  {message}")?;
            }
        }
        Ok(())
    }
}

impl From<ModelValidationError> for AppError {
    fn from(err: ModelValidationError) -> Self {
        let message = format!("invalid {}", err.model);
        AppError::validation_with_fields(message, err.errors)
    }
}

/// Reads typed fields out of a JSON object while accumulating errors.
#[derive(Debug)]
pub struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    /// Starts reading `value`. A non-object value is a root error.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        let mut errors = FieldErrors::new();
        let object = value.as_object();
        if object.is_none() {
            errors.add(ROOT_FIELD, "Input should be a valid object");
        }
        Self { object, errors }
    }

    /// Reads a field that must be present.
    pub fn required<T: DeserializeOwned>(&mut self, name: &str) -> Option<T> {
        let object = self.object?;
        match object.get(name) {
            Some(value) => self.decode(name, value),
            None => {
                self.errors.add(name, "Field required");
                None
            }
        }
    }

    /// Reads a field that may be absent or `null`.
    ///
    /// Returns `Some(None)` when the field is absent and `None` only when
    /// the field is present but invalid.
    pub fn optional<T: DeserializeOwned>(&mut self, name: &str) -> Option<Option<T>> {
        let object = self.object?;
        match object.get(name) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.decode(name, value).map(Some),
        }
    }

    /// Runs the `validator` rules declared on `rules` and records every
    /// failure against its field.
    pub fn validate<V: Validate>(&mut self, rules: &V) {
        if let Err(errors) = rules.validate() {
            merge_validation_errors(&mut self.errors, &errors);
        }
    }

    /// Finishes reading and returns the collected errors.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    fn decode<T: DeserializeOwned>(&mut self, name: &str, value: &Value) -> Option<T> {
        match <T as Deserialize>::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.add(name, e.to_string());
                None
            }
        }
    }
}

/// Copies `validator` failures into `target`, one message per failed rule.
///
/// A rule without a custom `message` is reported by its code.
pub fn merge_validation_errors(target: &mut FieldErrors, errors: &ValidationErrors) {
    for (field, failures) in errors.field_errors() {
        for failure in failures {
            let message = failure
                .message
                .as_ref()
                .map_or_else(|| failure.code.to_string(), ToString::to_string);
            target.add(field.to_string(), message);
        }
    }
}

/// Request-body extractor that validates a [`Model`].
///
/// Malformed JSON is a 400; well-formed JSON that fails the model is a 422
/// carrying the field errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Valid<T>(pub T);

impl<T> Valid<T> {
    /// Consumes the wrapper and returns the model.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Model> FromRequest for Valid<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let body = checked_body(ctx)?;
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
        })?;

        T::from_value(&value)
            .map(Valid)
            .map_err(|errors| ExtractionError::invalid_fields(ExtractionSource::Body, errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        label: Option<String>,
    }

    #[derive(Validate)]
    struct PointRules {
        #[validate(range(min = 0, message = "Input should be greater than or equal to 0"))]
        x: Option<i64>,
    }

    impl Model for Point {
        const NAME: &'static str = "Point";

        fn from_value(value: &Value) -> Result<Self, FieldErrors> {
            let mut fields = FieldReader::new(value);
            let x = fields.required::<i64>("x");
            let label = fields.optional::<String>("label");
            fields.validate(&PointRules { x });
            match (x, label, fields.into_errors()) {
                (Some(x), Some(label), errors) if errors.is_empty() => Ok(Point { x, label }),
                (.., errors) => Err(errors),
            }
        }
    }

    #[test]
    fn test_valid_model() {
        assert_eq!(
            Point::parse(&json!({"x": 3})).unwrap(),
            Point { x: 3, label: None }
        );
        assert_eq!(
            Point::parse(&json!({"x": 3, "label": "a"})).unwrap().label.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_every_bad_field_is_reported() {
        let err = Point::parse(&json!({"label": 5})).unwrap_err();
        assert_eq!(err.errors().get("x"), Some(&["Field required".to_string()][..]));
        assert!(err.errors().get("label").is_some());
        assert!(err.to_string().starts_with("2 validation errors for Point"));
    }

    #[test]
    fn test_type_error_message() {
        let err = Point::parse(&json!({"x": "not_an_int"})).unwrap_err();
        let messages = err.errors().get("x").unwrap();
        assert!(messages[0].contains("not_an_int"));
    }

    #[test]
    fn test_rule_failure_uses_rule_message() {
        let err = Point::parse(&json!({"x": -1})).unwrap_err();
        assert_eq!(
            err.errors().get("x").unwrap(),
            ["Input should be greater than or equal to 0"]
        );
    }

    #[test]
    fn test_rule_without_message_reports_code() {
        #[derive(Validate)]
        struct Contact {
            #[validate(email)]
            email: String,
        }

        let mut errors = FieldErrors::new();
        let failures = Contact {
            email: "nowhere".into(),
        }
        .validate()
        .unwrap_err();
        merge_validation_errors(&mut errors, &failures);
        assert_eq!(errors.get("email").unwrap(), ["email"]);
    }

    #[test]
    fn test_non_object_is_root_error() {
        let err = Point::parse(&json!([1, 2])).unwrap_err();
        assert!(err.errors().get(ROOT_FIELD).is_some());
    }

    #[test]
    fn test_valid_extractor_statuses() {
        let ctx = |body: &'static str| {
            ExtractionContextBuilder::new()
                .method(Method::POST)
                .uri(Uri::from_static("/points"))
                .body(body)
                .build()
        };

        let Valid(point) = Valid::<Point>::from_request(&ctx(r#"{"x": 1}"#)).unwrap();
        assert_eq!(point.x, 1);

        let err = Valid::<Point>::from_request(&ctx(r#"{"x": "a"}"#)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.field_errors().is_some());

        let err = Valid::<Point>::from_request(&ctx("{oops")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_app_error() {
        let err = Point::parse(&json!({})).unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.message(), "invalid Point");
    }
}
