//! Day-bucket arithmetic and input parsing helpers.
//!
//! A bucket is the number of whole local days since the Unix epoch for a
//! given UTC offset. Buckets are derived from stored UTC timestamps on every
//! query, so "today" stays correct across restarts and for users in
//! different timezones.

use crate::types::DayBucket;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Seconds in one bucket.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Maps a UTC instant to the local day bucket of a user with the given offset.
///
/// `floor((timestamp + offset) / 86400)`, using Euclidean division so instants
/// before the epoch still land in the right day.
pub fn day_bucket(timestamp: DateTime<Utc>, timezone_offset_seconds: i32) -> DayBucket {
    (timestamp.timestamp() + i64::from(timezone_offset_seconds)).div_euclid(SECONDS_PER_DAY)
}

/// Returns the half-open UTC second range `[start, end)` covered by a bucket.
pub fn bucket_bounds(bucket: DayBucket, timezone_offset_seconds: i32) -> (i64, i64) {
    let start = bucket * SECONDS_PER_DAY - i64::from(timezone_offset_seconds);
    (start, start + SECONDS_PER_DAY)
}

/// Today and the `days - 1` days before it, newest first.
pub fn trailing_buckets(today: DayBucket, days: u32) -> Vec<DayBucket> {
    (0..i64::from(days)).map(|delta| today - delta).collect()
}

/// Local calendar date of a bucket.
pub fn bucket_date(bucket: DayBucket) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(bucket))
}

/// Human label of a bucket, e.g. `Mon 2024/01/01`.
pub fn format_bucket_label(bucket: DayBucket) -> String {
    bucket_date(bucket).map_or_else(
        || format!("day {bucket}"),
        |date| date.format("%a %Y/%m/%d").to_string(),
    )
}

/// Formats the wall-clock time of a UTC instant in the user's local time.
pub fn format_local_time(timestamp: DateTime<Utc>, timezone_offset_seconds: i32) -> String {
    match FixedOffset::east_opt(timezone_offset_seconds) {
        Some(offset) => timestamp.with_timezone(&offset).format("%H:%M:%S").to_string(),
        None => timestamp.format("%H:%M:%S").to_string(),
    }
}

/// Characters stripped from both ends of a product name.
const NAME_TRIM: &[char] = &[' ', '\t', '\n', '\r', ',', '.', '"', '\''];

/// Canonical form of a product name: lower-cased, with surrounding
/// whitespace and `, . " '` removed.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().trim_matches(NAME_TRIM).to_string()
}

/// Parses a non-negative integer typed by the user.
///
/// Quick-choice shortcuts echo values as `/<value>`, so a single leading
/// slash is accepted and stripped.
pub fn parse_quantity(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bucket_utc() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();

        assert_eq!(day_bucket(midnight, 0), 19_723);
        assert_eq!(day_bucket(before, 0), 19_722);
    }

    #[test]
    fn test_day_bucket_with_offset() {
        // 22:30 UTC is already the next day three hours east.
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 22, 30, 0).unwrap();
        assert_eq!(day_bucket(late, 0), 19_723);
        assert_eq!(day_bucket(late, 3 * 3600), 19_724);

        // 01:00 UTC is still the previous day five hours west.
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
        assert_eq!(day_bucket(early, -5 * 3600), 19_723);
    }

    #[test]
    fn test_day_bucket_before_epoch() {
        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(day_bucket(before_epoch, 0), -1);
    }

    #[test]
    fn test_bucket_bounds_contain_bucket() {
        let offset = 3 * 3600;
        let (start, end) = bucket_bounds(19_724, offset);
        let first = Utc.timestamp_opt(start, 0).unwrap();
        let last = Utc.timestamp_opt(end - 1, 0).unwrap();

        assert_eq!(day_bucket(first, offset), 19_724);
        assert_eq!(day_bucket(last, offset), 19_724);
        assert_eq!(end - start, SECONDS_PER_DAY);
    }

    #[test]
    fn test_trailing_buckets() {
        assert_eq!(trailing_buckets(100, 7), vec![100, 99, 98, 97, 96, 95, 94]);
        assert!(trailing_buckets(100, 0).is_empty());
    }

    #[test]
    fn test_format_bucket_label() {
        assert_eq!(format_bucket_label(19_723), "Mon 2024/01/01");
        assert_eq!(format_bucket_label(0), "Thu 1970/01/01");
    }

    #[test]
    fn test_format_local_time() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 22, 30, 5).unwrap();
        assert_eq!(format_local_time(ts, 0), "22:30:05");
        assert_eq!(format_local_time(ts, 3 * 3600), "01:30:05");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Apple.\n"), "apple");
        assert_eq!(normalize("APPLE"), "apple");
        assert_eq!(normalize("\"Greek yogurt\","), "greek yogurt");
        assert_eq!(normalize(" .,'\"\t"), "");
        assert_eq!(normalize("dr. pepper"), "dr. pepper");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("52"), Some(52));
        assert_eq!(parse_quantity("/52"), Some(52));
        assert_eq!(parse_quantity(" 150 "), Some(150));
        assert_eq!(parse_quantity("0"), Some(0));

        assert_eq!(parse_quantity("//52"), None);
        assert_eq!(parse_quantity("-5"), None);
        assert_eq!(parse_quantity("+5"), None);
        assert_eq!(parse_quantity("12.5"), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("/"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("99999999999"), None);
    }
}
