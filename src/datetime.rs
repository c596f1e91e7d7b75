//! Date/time utilities for exported records.
//!
//! Forum rows store timestamps as unix seconds. Exported documents render
//! them in a configured timezone so the user can read them.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::ExportConfig;

/// Renders unix timestamps for exported documents.
#[derive(Debug, Clone)]
pub struct TimestampFormatter {
    tz: Tz,
    format: String,
}

impl TimestampFormatter {
    /// Create a formatter for the given timezone name and chrono format.
    ///
    /// Unknown timezone names fall back to UTC.
    pub fn new(timezone: &str, format: impl Into<String>) -> Self {
        Self {
            tz: timezone.parse().unwrap_or(Tz::UTC),
            format: format.into(),
        }
    }

    /// Create a formatter from the export configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.timezone, config.datetime_format.clone())
    }

    /// Format a unix timestamp.
    ///
    /// Out-of-range timestamps are rendered as the raw number.
    pub fn format(&self, timestamp: i64) -> String {
        match DateTime::<Utc>::from_timestamp(timestamp, 0) {
            Some(dt) => dt.with_timezone(&self.tz).format(&self.format).to_string(),
            None => timestamp.to_string(),
        }
    }
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Render a boolean the way exported documents show it.
pub fn yesno(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-15 10:30:00 UTC
    const TS: i64 = 1_705_314_600;

    #[test]
    fn test_format_utc() {
        let f = TimestampFormatter::new("UTC", "%Y/%m/%d %H:%M");
        assert_eq!(f.format(TS), "2024/01/15 10:30");
    }

    #[test]
    fn test_format_timezone() {
        let f = TimestampFormatter::new("Asia/Tokyo", "%Y/%m/%d %H:%M");
        assert_eq!(f.format(TS), "2024/01/15 19:30"); // UTC+9
    }

    #[test]
    fn test_format_invalid_timezone_falls_back_to_utc() {
        let f = TimestampFormatter::new("Invalid/Zone", "%Y/%m/%d %H:%M");
        assert_eq!(f.format(TS), "2024/01/15 10:30");
    }

    #[test]
    fn test_format_out_of_range() {
        let f = TimestampFormatter::new("UTC", "%Y");
        assert_eq!(f.format(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_default_format() {
        let f = TimestampFormatter::default();
        assert_eq!(f.format(TS), "Monday, 15 January 2024, 10:30 AM");
    }

    #[test]
    fn test_yesno() {
        assert_eq!(yesno(true), "Yes");
        assert_eq!(yesno(false), "No");
    }
}
