//! Utility functions for Salon Desk

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};

/// Parse a local time of day as sent by the backend
///
/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.ffffff`.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidValue`] for anything else, including an
/// empty string.
pub fn parse_time_of_day(raw: &str) -> crate::Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| crate::Error::InvalidValue {
            kind: "time of day",
            value: raw.to_string(),
        })
}

/// Minutes elapsed since midnight, seconds ignored
#[must_use]
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Calendar date of `instant` as seen from `offset`
#[must_use]
pub fn local_date(instant: &DateTime<FixedOffset>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}

/// Case-insensitive substring test
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Serde helpers for monetary amounts
///
/// The backend sends decimals as strings (`"45.00"`) on some endpoints and as
/// JSON numbers on others. Both deserialize to `f64`; an empty string reads
/// as zero. Amounts always serialize as numbers.
pub mod amount {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    /// Deserialize a string or numeric amount
    ///
    /// # Errors
    ///
    /// Fails when a string amount is not a decimal number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(value) => Ok(value),
            RawAmount::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(0.0);
                }
                text.parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid amount: {text:?}")))
            }
        }
    }

    /// Serialize an amount as a JSON number
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }
}
