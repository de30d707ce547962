//! # FastDCA Demo
//!
//! A small service showing the dependency patterns of FastDCA:
//!
//! | Route | Pattern |
//! |---|---|
//! | `GET /get-simple-goal` | static dependency |
//! | `GET /get-goal?username=` | dependency reading a required query parameter |
//! | `GET /signin?username=&password=` | dependency combining query parameters with an injected service |
//! | `GET /main/{num}` | several dependencies resolved for one handler |
//! | `GET /blog/{id}`, `GET /user/{id}` | [`GetObjectOr404`](fastdca_core::GetObjectOr404) over a catalog |
//! | `POST /users` | validated [`User`] body |
//!
//! [`app`] builds the server from an [`AppConfig`](fastdca_config::AppConfig),
//! so tests can drive it in memory.

#![doc(html_root_url = "https://docs.rs/fastdca-demo/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod deps;
mod model;

pub use app::{app, handlers, router};
pub use deps::{Credentials, Goal, LoginStatus, GOAL};
pub use model::{validation_report, User};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
