//! Error types for the Salon Desk toolkit

use std::{error::Error as StdError, fmt};

/// Main error type for the Salon Desk toolkit
#[derive(Debug)]
pub enum Error {
    /// Configuration sources could not be read or deserialized
    Load(config::ConfigError),

    /// Configuration error
    Configuration {
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

    /// A value received from the backend could not be interpreted
    InvalidValue {
        /// What kind of value was expected
        kind: &'static str,
        /// The offending input
        value: String,
    },

    /// Logging subscriber could not be installed
    Logging(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "Failed to load configuration: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::InvalidValue { kind, value } => write!(f, "Invalid {kind}: {value:?}"),
            Self::Logging(msg) => write!(f, "Logging setup failed: {msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Load(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Only the first failing field (by name) is reported
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref().map(ToString::to_string))
                    .unwrap_or_else(|| "is invalid".to_string());
                Self::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            None => Self::Validation {
                field: "form".to_string(),
                message: errors.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::missing_panics_doc,
    clippy::uninlined_format_args,
    clippy::unwrap_used
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_error_conversion() {
        let load_error = config::ConfigError::NotFound("api.base_url".to_string());
        let app_error = Error::from(load_error);

        assert!(matches!(app_error, Error::Load(_)));
        assert!(format!("{}", app_error).contains("Failed to load configuration"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_configuration_error() {
        let error = Error::Configuration {
            message: "Invalid base URL".to_string(),
        };

        assert_eq!(format!("{}", error), "Configuration error: Invalid base URL");
    }

    #[test]
    fn test_validation_error() {
        let error = Error::Validation {
            field: "client_email".to_string(),
            message: "Invalid email".to_string(),
        };

        assert_eq!(
            format!("{}", error),
            "Validation error: client_email - Invalid email"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_invalid_value_error() {
        let error = Error::InvalidValue {
            kind: "time of day",
            value: "9am".to_string(),
        };

        assert_eq!(format!("{}", error), "Invalid time of day: \"9am\"");
    }

    #[test]
    fn test_result_alias_usage() {
        fn returns_error() -> Result<i32> {
            Err(Error::Logging("subscriber already set".to_string()))
        }

        let err = returns_error().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Logging setup failed: subscriber already set"
        );
    }
}
