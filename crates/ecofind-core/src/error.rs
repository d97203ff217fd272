//! Error types for the `EcoFind` admin console

use std::{error::Error as StdError, fmt};

/// Main error type for the `EcoFind` admin console
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// List processing was configured with values no caller can satisfy
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Login rejected, or the account is not an administrator
    Authentication(String),

    /// Network or transport failure talking to the backend
    Transport(String),

    /// Backend answered with a non-success status
    Backend {
        /// HTTP status code returned by the backend
        status: u16,
        /// Backend-reported reason, if any
        message: String,
    },

    /// Backend returned a payload that does not match the expected schema
    MalformedResponse(String),

    /// Timeout error
    Timeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Serialization error
    Serialization(serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::InvalidConfig { message } => write!(f, "Invalid list configuration: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Self::Transport(msg) => write!(f, "Transport error: {msg}"),
            Self::Backend { status, message } => {
                write!(f, "Backend returned {status}: {message}")
            }
            Self::MalformedResponse(msg) => write!(f, "Malformed backend response: {msg}"),
            Self::Timeout { duration_ms } => {
                write!(f, "Operation timed out after {duration_ms}ms")
            }
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

// From implementations for automatic conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error = Error::from(io_error);

        match app_error {
            Error::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }

        assert!(app_error.to_string().contains("I/O error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_invalid_config_error() {
        let error = Error::InvalidConfig {
            message: "page size must be positive".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid list configuration: page size must be positive"
        );
    }

    #[test]
    fn test_backend_error_carries_status_and_reason() {
        let error = Error::Backend {
            status: 403,
            message: "Forbidden".to_string(),
        };

        assert_eq!(error.to_string(), "Backend returned 403: Forbidden");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#).unwrap_err();
        let app_error = Error::from(json_error);

        assert!(matches!(app_error, Error::Serialization(_)));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_all_error_display_variants() {
        let test_cases = vec![
            (Error::Io(io::Error::other("test")), "I/O error:"),
            (
                Error::Configuration {
                    message: "config error".to_string(),
                },
                "Configuration error: config error",
            ),
            (
                Error::Validation {
                    field: "email".to_string(),
                    message: "invalid".to_string(),
                },
                "Validation error: email - invalid",
            ),
            (
                Error::Authentication("Invalid credentials".to_string()),
                "Authentication failed: Invalid credentials",
            ),
            (
                Error::Transport("dns".to_string()),
                "Transport error: dns",
            ),
            (
                Error::MalformedResponse("missing field `users`".to_string()),
                "Malformed backend response: missing field `users`",
            ),
            (
                Error::Timeout { duration_ms: 5000 },
                "Operation timed out after 5000ms",
            ),
        ];

        for (error, expected_contains) in test_cases {
            let display_str = error.to_string();
            assert!(
                display_str.contains(expected_contains),
                "Error display '{display_str}' should contain '{expected_contains}'"
            );
        }
    }
}
