//! The `User` model and the validation report printed by `validate-demo`.

use std::fmt;

use fastdca_core::FieldErrors;
use fastdca_extract::{FieldReader, Model};
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

/// A user account as accepted by `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Numeric identifier.
    pub id: i64,
    /// Display name. Must not be empty.
    pub name: String,
    /// Contact address. Must be a valid email address.
    pub email: String,
    /// Age in years, if known. Must not be negative.
    pub age: Option<i64>,
}

/// Whichever `User` fields decoded, checked before the model is built.
#[derive(Debug, Validate)]
struct UserRules {
    #[validate(length(min = 1, message = "String should not be empty"))]
    name: Option<String>,
    #[validate(email(message = "Value is not a valid email address"))]
    email: Option<String>,
    #[validate(range(min = 0, message = "Input should be greater than or equal to 0"))]
    age: Option<i64>,
}

impl Model for User {
    const NAME: &'static str = "User";

    fn from_value(value: &Value) -> Result<Self, FieldErrors> {
        let mut fields = FieldReader::new(value);
        let id = fields.required::<i64>("id");
        let name = fields.required::<String>("name");
        let email = fields.required::<String>("email");
        let age = fields.optional::<i64>("age");

        fields.validate(&UserRules {
            name: name.clone(),
            email: email.clone(),
            age: age.flatten(),
        });

        match (id, name, email, age, fields.into_errors()) {
            (Some(id), Some(name), Some(email), Some(age), errors) if errors.is_empty() => {
                Ok(User {
                    id,
                    name,
                    email,
                    age,
                })
            }
            (.., errors) => Err(errors),
        }
    }
}

impl User {
    /// All four fields as a JSON object, with `age: null` when unknown.
    #[must_use]
    pub fn model_dump(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "age": self.age,
        })
    }
}

/// `id=1 name='Hadiqa Gohar' email='hg@example.com' age=19`
impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} name='{}' email='{}' age=",
            self.id, self.name, self.email
        )?;
        match self.age {
            Some(age) => write!(f, "{age}"),
            None => f.write_str("None"),
        }
    }
}

/// Validates one good and one bad sample and describes the outcome line by
/// line.
pub fn validation_report() -> String {
    let mut lines = Vec::new();

    let valid = json!({"id": 1, "name": "Hadiqa Gohar", "email": "hg@example.com", "age": 19});
    match User::parse(&valid) {
        Ok(user) => {
            lines.push(user.to_string());
            lines.push(user.model_dump().to_string());
        }
        Err(e) => lines.push(e.to_string()),
    }

    let invalid = json!({"id": "not_an_int", "name": "Bob", "email": "bob@example.com"});
    match User::parse(&invalid) {
        Ok(user) => lines.push(user.to_string()),
        Err(e) => lines.push(e.to_string()),
    }

    lines.join("\n")
}
