//! Utility functions and helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use percent_encoding::percent_decode_str;

/// Parse a server timestamp into an instant.
///
/// Accepts RFC 3339 (`2024-01-02T08:00:00Z`, with or without offset),
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Extract the filename from a `Content-Disposition` header value.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    // filename*=UTF-8''name takes precedence over filename="name"
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        if let Some(encoded) = part.strip_prefix("filename*=") {
            let value = encoded.trim_matches('"');
            let value = value.rsplit("''").next().unwrap_or(value);
            return Some(percent_decode(value));
        }
        if let Some(value) = part.strip_prefix("filename=") {
            plain = Some(percent_decode(value.trim_matches('"')));
        }
    }
    plain.filter(|name| !name.is_empty())
}

fn percent_decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}
