//! Timestamp to snowflake conversion.
//!
//! Discord ids are snowflakes: the high 42 bits carry milliseconds since the
//! Discord epoch (2015-01-01T00:00:00Z). Date filters are translated into
//! `min_id`/`max_id` bounds by synthesizing a snowflake for the boundary
//! timestamp.

use chrono::{DateTime, NaiveDate, Utc};

/// Discord's custom epoch, in milliseconds since the Unix epoch.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Convert a timestamp to a snowflake string.
///
/// Computes `(ms_since_unix_epoch - DISCORD_EPOCH_MS) << 22`. Timestamps at
/// or before the Discord epoch clamp to `"0"`.
pub fn from_datetime(ts: DateTime<Utc>) -> String {
    let ms = ts.timestamp_millis() - DISCORD_EPOCH_MS;
    if ms <= 0 {
        return "0".to_string();
    }
    ((ms as u64) << 22).to_string()
}

/// Convert a calendar date (taken at midnight UTC) to a snowflake string.
pub fn from_date(date: NaiveDate) -> String {
    from_datetime(date.and_hms_opt(0, 0, 0).unwrap().and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_value() {
        // One day past the Discord epoch: 86_400_000 ms << 22.
        let expected = (86_400_000u64 << 22).to_string();
        assert_eq!(from_date(date(2015, 1, 2)), expected);
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(from_date(date(2015, 1, 1)), "0");
    }

    #[test]
    fn test_pre_epoch_clamps_to_zero() {
        assert_eq!(from_date(date(2014, 6, 1)), "0");
        assert_eq!(from_date(date(1970, 1, 1)), "0");
    }

    #[test]
    fn test_deterministic() {
        let d = date(2023, 3, 14);
        assert_eq!(from_date(d), from_date(d));
    }

    #[test]
    fn test_monotonic() {
        let dates = [
            date(2015, 1, 2),
            date(2016, 7, 1),
            date(2020, 2, 29),
            date(2024, 12, 31),
        ];
        let snowflakes: Vec<u64> = dates
            .iter()
            .map(|d| from_date(*d).parse().unwrap())
            .collect();
        for pair in snowflakes.windows(2) {
            assert!(pair[0] < pair[1], "snowflakes must increase with dates");
        }
    }
}
