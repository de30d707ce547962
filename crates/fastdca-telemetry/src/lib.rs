//! # FastDCA Telemetry
//!
//! Structured logging for FastDCA services. [`init_logging`] installs a
//! `tracing-subscriber` registry with an [`EnvFilter`] and a JSON, pretty
//! or compact formatter chosen by [`LogConfig`].
//!
//! The server logs one event per request carrying `request_id`,
//! `operation_id`, `http.method`, `http.path`, `http.status_code` and
//! `duration_ms`.
//!
//! [`EnvFilter`]: tracing_subscriber::EnvFilter

#![doc(html_root_url = "https://docs.rs/fastdca-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
