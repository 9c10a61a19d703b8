use chrono::{DateTime, NaiveDateTime, Timelike};

use super::error::{Error, Result};

/// EXIF date grammar.
pub const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// Dash-separated variant written by some Samsung firmwares (panoramas).
pub const VENDOR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Fixed-width, sortable output form.
pub const CANONICAL_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Seconds between the QuickTime epoch (1904-01-01) and the Unix epoch.
pub const QUICKTIME_EPOCH_OFFSET: i64 = 2_082_844_800;

pub fn format_canonical(value: &NaiveDateTime) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

/// Parse a raw date string and return it as `YYYYMMDD-HHMMSS`.
///
/// No timezone conversion happens: the fields are taken as they are written.
pub fn normalize(raw: &str) -> Result<String> {
    let parsed = parse(raw, EXIF_FORMAT).or_else(|primary| {
        parse(raw, VENDOR_FORMAT).map_err(|fallback| Error::DateParse {
            value: raw.to_string(),
            reason: format!("{}; fallback: {}", primary, fallback),
        })
    })?;
    Ok(format_canonical(&parsed))
}

fn parse(raw: &str, format: &str) -> std::result::Result<NaiveDateTime, String> {
    let parsed = NaiveDateTime::parse_from_str(raw, format).map_err(|e| e.to_string())?;
    // chrono keeps second 60 as a leap second; it has no HHMMSS form
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err("second out of range".to_string());
    }
    Ok(parsed)
}

/// Canonical form of a QuickTime timestamp (seconds since 1904-01-01 UTC).
pub fn from_quicktime_seconds(seconds: u64) -> Result<String> {
    let unix = i64::try_from(seconds)
        .ok()
        .map(|s| s - QUICKTIME_EPOCH_OFFSET)
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| Error::InvalidFormat(format!("movie timestamp {} out of range", seconds)))?;
    Ok(format_canonical(&unix.naive_utc()))
}
