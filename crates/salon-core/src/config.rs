//! Configuration management for Salon Desk

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Refresh intervals for the dashboard feeds
    #[serde(default)]
    pub polling: PollingConfig,

    /// Dashboard statistics configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Refresh intervals, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Today's appointments
    #[serde(default = "default_todays_interval")]
    pub todays_interval_secs: u64,

    /// Full appointment list
    #[serde(default = "default_appointments_interval")]
    pub appointments_interval_secs: u64,

    /// Per-status totals
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Appointments with outstanding payments
    #[serde(default = "default_payment_pending_interval")]
    pub payment_pending_interval_secs: u64,
}

/// Dashboard statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Number of dates kept in the appointment trend
    #[serde(default = "default_trend_days")]
    pub trend_days: usize,

    /// How far back the trend query reaches, in days
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_todays_interval() -> u64 {
    30
}

const fn default_appointments_interval() -> u64 {
    60
}

const fn default_stats_interval() -> u64 {
    60
}

const fn default_payment_pending_interval() -> u64 {
    300
}

const fn default_trend_days() -> usize {
    14
}

const fn default_trend_window_days() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            todays_interval_secs: default_todays_interval(),
            appointments_interval_secs: default_appointments_interval(),
            stats_interval_secs: default_stats_interval(),
            payment_pending_interval_secs: default_payment_pending_interval(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            trend_window_days: default_trend_window_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL with any trailing slash removed
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl PollingConfig {
    /// Interval between refreshes of today's appointments
    #[must_use]
    pub const fn todays_interval(&self) -> Duration {
        Duration::from_secs(self.todays_interval_secs)
    }

    /// Interval between refreshes of the full appointment list
    #[must_use]
    pub const fn appointments_interval(&self) -> Duration {
        Duration::from_secs(self.appointments_interval_secs)
    }

    /// Interval between refreshes of the per-status totals
    #[must_use]
    pub const fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    /// Interval between refreshes of the payment-pending list
    #[must_use]
    pub const fn payment_pending_interval(&self) -> Duration {
        Duration::from_secs(self.payment_pending_interval_secs)
    }
}

impl Config {
    /// Load configuration from environment and files
    ///
    /// Reads an optional `config.{toml,json,yaml}` file from the working
    /// directory, then `SALON_`-prefixed environment variables such as
    /// `SALON_API__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(config::File::with_name("config").required(false))
    }

    /// Load configuration from a specific source layered under the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load_from<S>(source: S) -> crate::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .add_source(
                config::Environment::with_prefix("SALON")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] for an empty base URL, a zero
    /// timeout or a zero polling interval.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |message: &str| {
            Err(crate::Error::Configuration {
                message: message.to_string(),
            })
        };

        if self.api.normalized_base_url().is_empty() {
            return invalid("api.base_url must not be empty");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return invalid("api.base_url must be an http(s) URL");
        }
        if self.api.timeout_ms == 0 {
            return invalid("api.timeout_ms must be greater than zero");
        }
        if self.polling.todays_interval_secs == 0
            || self.polling.appointments_interval_secs == 0
            || self.polling.stats_interval_secs == 0
            || self.polling.payment_pending_interval_secs == 0
        {
            return invalid("polling intervals must be greater than zero");
        }
        if self.dashboard.trend_days == 0 {
            return invalid("dashboard.trend_days must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_ms, 5_000);
        assert_eq!(config.api.timeout(), Duration::from_secs(5));

        assert_eq!(config.polling.todays_interval(), Duration::from_secs(30));
        assert_eq!(config.polling.appointments_interval(), Duration::from_secs(60));
        assert_eq!(config.polling.stats_interval(), Duration::from_secs(60));
        assert_eq!(
            config.polling.payment_pending_interval(),
            Duration::from_secs(300)
        );

        assert_eq!(config.dashboard.trend_days, 14);
        assert_eq!(config.dashboard.trend_window_days, 30);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalized_base_url() {
        let api = ApiConfig {
            base_url: "https://salon.example.com/api/".to_string(),
            timeout_ms: 1_000,
        };
        assert_eq!(api.normalized_base_url(), "https://salon.example.com/api");
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://salon.example.com/api"},
            "polling": {"todays_interval_secs": 10}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.api.base_url, "https://salon.example.com/api");
        assert_eq!(config.api.timeout_ms, 5_000); // Uses default
        assert_eq!(config.polling.todays_interval_secs, 10);
        assert_eq!(config.polling.stats_interval_secs, 60); // Uses default
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_toml_source() {
        let source = config::File::from_str(
            r#"
            [api]
            base_url = "https://booking.example.com/api/"
            timeout_ms = 2500

            [logging]
            format = "text"
            "#,
            config::FileFormat::Toml,
        );

        let config = Config::load_from(source).unwrap();
        assert_eq!(config.api.normalized_base_url(), "https://booking.example.com/api");
        assert_eq!(config.api.timeout_ms, 2_500);
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_reports_unreadable_source() {
        let source = config::File::from_str("[api\nbase_url = ", config::FileFormat::Toml);

        let err = Config::load_from(source).unwrap_err();
        assert!(matches!(err, crate::Error::Load(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_from_rejects_wrong_types() {
        let source = config::File::from_str(
            r#"
            [api]
            timeout_ms = "soon"
            "#,
            config::FileFormat::Toml,
        );

        assert!(matches!(
            Config::load_from(source),
            Err(crate::Error::Load(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(crate::Error::Configuration { .. })
        ));

        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.polling.todays_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dashboard.trend_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.api.base_url, config.api.base_url);
        assert_eq!(
            deserialized.polling.todays_interval_secs,
            config.polling.todays_interval_secs
        );
        assert_eq!(deserialized.dashboard.trend_days, config.dashboard.trend_days);
    }
}
