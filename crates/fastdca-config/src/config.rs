//! Configuration schema.
//!
//! Every section has defaults, so a configuration file only needs the keys
//! it changes. Unknown keys are rejected.

use std::fmt;
use std::time::Duration;

use fastdca_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level configuration of a FastDCA service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Log output settings.
    pub logging: LogConfig,
    /// Credentials accepted by the sign-in route.
    pub login: LoginSettings,
}

impl AppConfig {
    /// Defaults with human-readable debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Checks values that the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "server.service_name",
                "must not be empty",
            ));
        }

        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Bind address.
    pub http_addr: String,
    /// Seconds to wait for open connections on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Name reported by `/health`.
    pub service_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:8000".to_string(),
            shutdown_timeout_secs: 30,
            request_timeout_ms: 30_000,
            service_name: "fastdca-demo".to_string(),
        }
    }
}

impl ServerSettings {
    /// Shutdown timeout as a [`Duration`].
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Username and password the sign-in route compares against.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginSettings {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl fmt::Debug for LoginSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
