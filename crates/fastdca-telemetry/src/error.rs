//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level string is not a valid filter directive.
    #[error("invalid log level '{level}': {reason}")]
    InvalidLevel {
        /// The rejected directive.
        level: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::InvalidLevel {
            level: "loud".into(),
            reason: "unknown".into(),
        };
        assert_eq!(err.to_string(), "invalid log level 'loud': unknown");

        let err = TelemetryError::LoggingInit("already set".into());
        assert!(err.to_string().contains("already set"));
    }
}
