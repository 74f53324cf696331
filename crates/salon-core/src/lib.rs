//! Core types and utilities for Salon Desk

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use types::{Appointment, AppointmentStatus, Page, PaymentStatus, RecordId};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The format is JSON
/// unless `logging.format` is `text`.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| Error::Configuration {
            message: format!("invalid log level {:?}: {e}", config.level),
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.format.eq_ignore_ascii_case("text") {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    };

    installed.map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_once() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "text".to_string(),
        };

        // The first call may race with other tests in this binary; the second must fail
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(Error::Logging(_))));
    }
}
