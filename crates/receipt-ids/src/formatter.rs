//! Moscow-time timestamp formatting and parsing

use crate::{IdError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Receipt timestamps are printed in Moscow time (UTC+3, no DST)
const MSK_OFFSET_SECONDS: i32 = 3 * 3600;

/// Naive timestamp layouts accepted by [`parse_when`]
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-aware timestamp layouts accepted by [`parse_when`]
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// The fixed UTC+3 offset
pub fn msk_offset() -> FixedOffset {
    FixedOffset::east_opt(MSK_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Format a timestamp as printed on the receipt, e.g. "17.08.2025 22:41:38 мск"
pub fn format_msk<Tz: TimeZone>(when: &DateTime<Tz>) -> String {
    when.with_timezone(&msk_offset())
        .format("%d.%m.%Y %H:%M:%S мск")
        .to_string()
}

/// Parse an ISO-8601 timestamp
///
/// Timestamps without an offset (including bare dates) are taken to be
/// Moscow time.
///
/// # Examples
/// ```
/// use receipt_ids::{format_msk, parse_when};
/// let when = parse_when("2025-08-17 19:41:38+00:00").unwrap();
/// assert_eq!(format_msk(&when), "17.08.2025 22:41:38 мск");
/// ```
pub fn parse_when(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(when) = DateTime::parse_from_rfc3339(value) {
        return Ok(when);
    }
    for format in OFFSET_FORMATS {
        if let Ok(when) = DateTime::parse_from_str(value, format) {
            return Ok(when);
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| IdError::InvalidTimestamp(value.to_string()))?;

    msk_offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| IdError::InvalidTimestamp(value.to_string()))
}
