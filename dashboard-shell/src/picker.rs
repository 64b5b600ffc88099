use chrono::{DateTime, NaiveDateTime, Utc};
use metrics_core::{Timestamp, MINUTE_MS};

const PICKER_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Placeholder shown on the picker button before an anchor is chosen.
pub const PICKER_PLACEHOLDER: &str = "Pick a date";

/// Parse a `datetime-local` input value. `utc_offset_minutes` follows
/// `Date.getTimezoneOffset()`: UTC minus local time.
pub fn parse_picker_value(value: &str, utc_offset_minutes: i64) -> Option<Timestamp> {
    let value = value.trim();
    let naive = PICKER_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())?;
    Some(naive.and_utc().timestamp_millis() + utc_offset_minutes * MINUTE_MS)
}

fn local_naive(ts: Timestamp, utc_offset_minutes: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(ts - utc_offset_minutes * MINUTE_MS).map(|dt| dt.naive_utc())
}

/// Inverse of [`parse_picker_value`], minute precision.
pub fn format_picker_value(ts: Timestamp, utc_offset_minutes: i64) -> String {
    local_naive(ts, utc_offset_minutes)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

pub fn format_anchor_label(ts: Timestamp, utc_offset_minutes: i64) -> String {
    local_naive(ts, utc_offset_minutes)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| PICKER_PLACEHOLDER.to_string())
}
