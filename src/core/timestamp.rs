//! Record timestamp formatting
//!
//! Records carry their time as `2025-01-08T10:30:45.12+0100`: seconds, then up
//! to three fractional digits with trailing zeros trimmed, then `Z` for UTC or
//! a `+hhmm`/`-hhmm` offset.

use chrono::{DateTime, FixedOffset, Offset, TimeZone};
use std::fmt;

const SECONDS_PATTERN: &str = "%Y-%m-%dT%H:%M:%S";

/// Format a datetime in the fixed record pattern
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mango_logger::core::format_record_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(format_record_timestamp(&ts), "2025-01-08T10:30:45Z");
/// ```
#[must_use]
pub fn format_record_timestamp<Tz>(datetime: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = datetime.format(SECONDS_PATTERN).to_string();

    // leap seconds report >= 1000 ms
    let millis = datetime.timestamp_subsec_millis() % 1000;
    if millis > 0 {
        let fraction = format!("{:03}", millis);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    if datetime.offset().fix().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&datetime.format("%z").to_string());
    }
    out
}

/// Parse a timestamp produced by [`format_record_timestamp`]
pub fn parse_record_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = match value.strip_suffix('Z') {
        Some(rest) => format!("{}+0000", rest),
        None => value.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z").ok()
}
