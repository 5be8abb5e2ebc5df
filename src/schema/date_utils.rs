//! Date parsing for admission timestamps stored as text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-time formats tried before falling back to date-only formats
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an admission timestamp from text
///
/// Accepts ISO date-times (with or without fractional seconds or an RFC 3339
/// offset) and the date-only layouts recognised by [`detect_date_format`].
/// Date-only values map to midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }

    parse_date_string(s).and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse a date-only string using the detected layout
#[must_use]
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let format = detect_date_format(s)?;
    NaiveDate::parse_from_str(s, format).ok()
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    // YYYY-MM-DD
    if s.len() == 10 && s.chars().nth(4) == Some('-') && s.chars().nth(7) == Some('-') {
        return Some("%Y-%m-%d");
    }

    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 3 {
            if parts[0].len() == 4 {
                return Some("%Y/%m/%d");
            } else if parts[2].len() == 4 {
                // Ambiguous day/month order defaults to day first
                return Some("%d/%m/%Y");
            }
        }
    }

    if s.contains('.') {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts[2].len() == 4 {
            return Some("%d.%m.%Y");
        }
    }

    // YYYYMMDD
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return Some("%Y%m%d");
    }

    None
}
