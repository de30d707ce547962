//! Dependencies resolved before the demo handlers run.
//!
//! Each function returns a fresh [`Dependency`] value. Route composition in
//! [`crate::app`] decides which handler receives which outputs.

use fastdca_config::LoginSettings;
use fastdca_core::Catalog;
use fastdca_extract::{
    dependency_fn, path_param, Dependency, ExtractionContext, FromRequest, Inject, Query,
};
use serde::{Deserialize, Serialize};

/// Goal returned by the goal routes.
pub const GOAL: &str = "We are building AI Agents Workforce";

/// Body of `/get-simple-goal` and `/get-goal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    /// The goal statement.
    pub goal: &'static str,
    /// Who asked, when the route takes a username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Sign-in outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginStatus {
    /// `"Login Successful"` or `"Login Failed"`.
    pub message: &'static str,
}

impl LoginStatus {
    /// Successful sign-in.
    pub const SUCCESS: Self = Self {
        message: "Login Successful",
    };
    /// Rejected sign-in.
    pub const FAILURE: Self = Self {
        message: "Login Failed",
    };
}

/// Credentials `/signin` compares against, registered in the container.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether both supplied values are present and match.
    #[must_use]
    pub fn matches(&self, username: Option<&str>, password: Option<&str>) -> bool {
        username == Some(self.username.as_str()) && password == Some(self.password.as_str())
    }
}

impl From<&LoginSettings> for Credentials {
    fn from(settings: &LoginSettings) -> Self {
        Self::new(&settings.username, &settings.password)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct GoalParams {
    username: String,
}

#[derive(Debug, Deserialize)]
struct SigninParams {
    username: Option<String>,
    password: Option<String>,
}

/// The static goal. Takes nothing from the request.
pub fn simple_goal() -> impl Dependency<Output = Goal> {
    dependency_fn(|_ctx: &ExtractionContext| {
        Ok(Goal {
            goal: GOAL,
            username: None,
        })
    })
}

/// The goal tagged with the required `username` query parameter.
pub fn goal() -> impl Dependency<Output = Goal> {
    dependency_fn(|ctx: &ExtractionContext| {
        let Query(params) = Query::<GoalParams>::from_request(ctx)?;
        Ok(Goal {
            goal: GOAL,
            username: Some(params.username),
        })
    })
}

/// Compares the optional `username` and `password` query parameters with
/// the injected [`Credentials`].
pub fn login() -> impl Dependency<Output = LoginStatus> {
    dependency_fn(|ctx: &ExtractionContext| {
        let Query(params) = Query::<SigninParams>::from_request(ctx)?;
        let Inject(credentials) = Inject::<Credentials>::from_request(ctx)?;
        let status = if credentials.matches(params.username.as_deref(), params.password.as_deref())
        {
            LoginStatus::SUCCESS
        } else {
            LoginStatus::FAILURE
        };
        Ok(status)
    })
}

/// The `num` path parameter plus `offset`.
///
/// The path value must fit an `i64`; the sum is widened to `i128` so any
/// such value has an exact result.
pub fn num_plus(offset: i64) -> impl Dependency<Output = i128> {
    dependency_fn(move |ctx: &ExtractionContext| {
        let num: i64 = path_param(ctx, "num")?;
        Ok(i128::from(num) + i128::from(offset))
    })
}

/// Blog titles served by `/blog/{id}`.
pub fn blogs() -> Catalog<String> {
    [
        ("1", "Generative AI Blog"),
        ("2", "Machine Learning Blog"),
        ("3", "Deep Learning Blog"),
    ]
    .into_iter()
    .map(|(id, title)| (id, title.to_string()))
    .collect()
}

/// User names served by `/user/{id}`.
pub fn users() -> Catalog<String> {
    [("8", "Ahmed"), ("9", "Mohammed")]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect()
}
