//! Layered configuration loading.
//!
//! Layers apply in this order, later layers winning:
//!
//! 1. built-in defaults (or a preset),
//! 2. TOML or JSON files, in the order they are added,
//! 3. variables from a `.env` file,
//! 4. process environment variables.
//!
//! Files are deep-merged, so a file that sets only `server.http_addr` keeps
//! every other value from the layers beneath it. Environment variables use
//! the `PREFIX__SECTION__KEY` shape, e.g. `FASTDCA__LOGIN__PASSWORD`, and
//! take the type of the value they replace.
//!
//! # Example
//!
//! ```rust
//! use fastdca_config::{ConfigFormat, ConfigLoader};
//!
//! let config = ConfigLoader::new()
//!     .with_string("[server]\nhttp_addr = \"0.0.0.0:9000\"", ConfigFormat::Toml)
//!     .unwrap()
//!     .with_env_prefix("FASTDCA")
//!     .with_env_vars([("FASTDCA__LOGIN__USERNAME", "root")])
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.server.http_addr, "0.0.0.0:9000");
//! assert_eq!(config.login.username, "root");
//! assert_eq!(config.login.password, "admin");
//! ```

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{AppConfig, ConfigError};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "FASTDCA";

/// Format of configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse(self, content: &str) -> Result<Value, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Builder that stacks configuration layers into an [`AppConfig`].
#[derive(Debug)]
pub struct ConfigLoader {
    config: AppConfig,
    env_prefix: Option<String>,
    dotenv_vars: Vec<(String, String)>,
    env_vars: Option<Vec<(String, String)>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from [`AppConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            env_prefix: None,
            dotenv_vars: Vec::new(),
            env_vars: None,
        }
    }

    /// Replaces the base layer with [`AppConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = AppConfig::development();
        self
    }

    /// Merges a TOML or JSON file, chosen by extension. The file must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.with_string(&content, format)
    }

    /// Like [`with_file`](Self::with_file), skipping a missing file.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges configuration text.
    pub fn with_string(mut self, content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let overlay = format.parse(content)?;
        let mut base = serde_json::to_value(&self.config)?;
        deep_merge(&mut base, overlay);
        self.config = serde_json::from_value(base)?;
        Ok(self)
    }

    /// Enables environment overrides under `prefix` (see [`DEFAULT_ENV_PREFIX`]).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_ascii_uppercase());
        self
    }

    /// Reads variables from a `.env` file without touching the process
    /// environment. A missing file is skipped. Real environment variables
    /// still win over these.
    pub fn with_dotenv(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(self);
        }
        for entry in dotenvy::from_path_iter(path)? {
            self.dotenv_vars.push(entry?);
        }
        Ok(self)
    }

    /// Uses `vars` instead of the process environment.
    #[must_use]
    pub fn with_env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Applies environment overrides and validates the result.
    pub fn load(self) -> Result<AppConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating.
    pub fn load_unvalidated(self) -> Result<AppConfig, ConfigError> {
        let Some(prefix) = self.env_prefix else {
            return Ok(self.config);
        };

        let process_vars = match self.env_vars {
            Some(vars) => vars,
            None => std::env::vars().collect(),
        };

        let mut document = serde_json::to_value(&self.config)?;
        for (key, value) in self.dotenv_vars.iter().chain(process_vars.iter()) {
            apply_env_var(&mut document, &prefix, key, value)?;
        }
        Ok(serde_json::from_value(document)?)
    }
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn apply_env_var(
    document: &mut Value,
    prefix: &str,
    key: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    let Some(path) = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix("__"))
    else {
        return Ok(());
    };

    let mut segments = path.split("__").map(str::to_ascii_lowercase);
    let mut slot = document;
    let mut current = segments.next();
    while let Some(segment) = current {
        let next = segments.next();
        let object: &mut Map<String, Value> = slot
            .as_object_mut()
            .ok_or_else(|| ConfigError::env_parse(key, "path descends into a scalar"))?;
        let child = object
            .get_mut(&segment)
            .ok_or_else(|| ConfigError::env_parse(key, "unknown configuration key"))?;
        if next.is_none() {
            *child = coerce(key, child, raw)?;
            return Ok(());
        }
        slot = child;
        current = next;
    }
    Err(ConfigError::env_parse(key, "missing configuration key"))
}

fn coerce(key: &str, existing: &Value, raw: &str) -> Result<Value, ConfigError> {
    match existing {
        Value::Bool(_) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| ConfigError::env_parse(key, "expected boolean")),
        Value::Number(_) => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| ConfigError::env_parse(key, "expected non-negative integer")),
        Value::Object(_) => Err(ConfigError::env_parse(key, "names a section, not a key")),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastdca_telemetry::LogFormat;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_only() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_toml_file_is_merged() {
        let file = temp_file(
            ".toml",
            r#"
            [server]
            http_addr = "0.0.0.0:9000"

            [logging]
            format = "compact"
            "#,
        );

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:9000");
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_file_over_preset() {
        let file = temp_file(".json", r#"{"login": {"password": "s3cret"}}"#);
        let config = ConfigLoader::new()
            .with_development()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.login.password, "s3cret");
        assert_eq!(config.login.username, "admin");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let err = ConfigLoader::new().with_file("/no/such/fastdca.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        assert!(ConfigLoader::new()
            .with_optional_file("/no/such/fastdca.toml")
            .is_ok());

        let file = temp_file(".yaml", "server: {}");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let err = ConfigLoader::new()
            .with_string("[server]\nport = 80", ConfigFormat::Toml)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_env_overrides_are_typed() {
        let config = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([
                ("FASTDCA__SERVER__REQUEST_TIMEOUT_MS", "250"),
                ("FASTDCA__LOGGING__SPAN_EVENTS", "yes"),
                ("FASTDCA__LOGGING__FORMAT", "pretty"),
                ("UNRELATED__SERVER__HTTP_ADDR", "ignored"),
            ])
            .load()
            .unwrap();

        assert_eq!(config.server.request_timeout_ms, 250);
        assert!(config.logging.span_events);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.server.http_addr, "127.0.0.1:8000");
    }

    #[test]
    fn test_env_errors() {
        let err = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([("FASTDCA__SERVER__REQUEST_TIMEOUT_MS", "soon")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParse { .. }));

        let err = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([("FASTDCA__SERVER__PORT", "80")])
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("unknown configuration key"));

        let err = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([("FASTDCA__LOGIN", "x")])
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("section"));
    }

    #[test]
    fn test_dotenv_below_process_env() {
        let dotenv = temp_file(
            ".env",
            "FASTDCA__LOGIN__USERNAME=dotenv-user\nFASTDCA__LOGIN__PASSWORD=dotenv-pass\n",
        );

        let config = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_dotenv(dotenv.path())
            .unwrap()
            .with_env_vars([("FASTDCA__LOGIN__PASSWORD", "env-pass")])
            .load()
            .unwrap();

        assert_eq!(config.login.username, "dotenv-user");
        assert_eq!(config.login.password, "env-pass");
    }

    #[test]
    fn test_missing_dotenv_is_skipped() {
        assert!(ConfigLoader::new().with_dotenv("/no/such/.env").is_ok());
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let err = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([("FASTDCA__SERVER__HTTP_ADDR", "nowhere")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let unvalidated = ConfigLoader::new()
            .with_env_prefix("FASTDCA")
            .with_env_vars([("FASTDCA__SERVER__HTTP_ADDR", "nowhere")])
            .load_unvalidated()
            .unwrap();
        assert_eq!(unvalidated.server.http_addr, "nowhere");
    }
}
