//! Server clock parsing.
//!
//! The stop-info service reports its current time as JavaScript `Date`
//! text (`Fri Oct 16 2026 14:03:11 GMT+0300 (MSK)`) while arrival
//! estimates are Unix timestamps, so the text is converted before any
//! arrival math happens.

use crate::error::TimestampError;
use chrono::DateTime;

/// Layout of the server time without the trailing `(TZ)` name.
const SERVER_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// Parses server time text into seconds since the Unix epoch.
///
/// The GMT offset decides the instant; the parenthesized zone name is
/// informational and ignored.
pub fn parse_server_time(text: &str) -> Result<f64, TimestampError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimestampError::Missing);
    }

    let without_zone_name = match text.rfind(" (") {
        Some(idx) if text.ends_with(')') => &text[..idx],
        _ => text,
    };

    DateTime::parse_from_str(without_zone_name, SERVER_TIME_FORMAT)
        .map(|dt| dt.timestamp() as f64)
        .map_err(|source| TimestampError::Format { text: text.to_string(), source })
}
