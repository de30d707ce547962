//! Typed configuration for FastDCA services.
//!
//! [`AppConfig`] holds three sections:
//!
//! - [`ServerSettings`]: bind address, timeouts and the service name
//! - [`LogConfig`](fastdca_telemetry::LogConfig): log level and format
//! - [`LoginSettings`]: the credentials the sign-in route accepts
//!
//! [`ConfigLoader`] layers defaults, files, a `.env` file and environment
//! variables. Unknown keys fail the load.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8000"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! service_name = "fastdca-demo"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [login]
//! username = "admin"
//! password = "admin"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `FASTDCA__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `FASTDCA__LOGGING__LEVEL=debug`
//! - `FASTDCA__LOGIN__PASSWORD=hunter2`

#![doc(html_root_url = "https://docs.rs/fastdca-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{AppConfig, LoginSettings, ServerSettings};
pub use error::ConfigError;
pub use loader::{ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};
