//! Calendar-date parsing and epoch conversions for reward queries.

use crate::rewards::client::RewardsError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(s: &str) -> Result<Date, RewardsError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &format).map_err(|_| RewardsError::InvalidDate(s.to_string()))
}

/// Format a calendar date as ISO `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_default()
}

/// Epoch milliseconds at midnight UTC of `date`, matching how the query
/// window boundaries are expressed upstream.
pub fn date_to_epoch_ms(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp() * 1000
}

/// Current instant in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Truncate an upstream epoch-millisecond timestamp to a calendar day at
/// the given offset: `ms / 1000` seconds, shifted, then the date part.
pub fn timestamp_ms_to_date(ms: i64, offset: UtcOffset) -> Result<Date, RewardsError> {
    let secs = ms / 1000;
    let dt =
        OffsetDateTime::from_unix_timestamp(secs).map_err(|_| RewardsError::Timestamp(ms))?;
    Ok(dt.to_offset(offset).date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn parse_and_format_roundtrip() {
        let date = parse_iso_date("2023-11-29").unwrap();
        assert_eq!(
            date,
            Date::from_calendar_date(2023, Month::November, 29).unwrap()
        );
        assert_eq!(format_iso_date(date), "2023-11-29");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_iso_date("29/11/2023").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn date_window_in_epoch_ms() {
        let date = parse_iso_date("2023-11-29").unwrap();
        assert_eq!(date_to_epoch_ms(date), 1_701_216_000_000);
    }

    #[test]
    fn timestamp_truncates_to_utc_day() {
        // 1700000000000 ms -> 2023-11-14T22:13:20Z
        let date = timestamp_ms_to_date(1_700_000_000_000, UtcOffset::UTC).unwrap();
        assert_eq!(format_iso_date(date), "2023-11-14");
    }

    #[test]
    fn timestamp_respects_local_offset() {
        let plus_ten = UtcOffset::from_hms(10, 0, 0).unwrap();
        let date = timestamp_ms_to_date(1_700_000_000_000, plus_ten).unwrap();
        // 22:13 UTC is already the 15th at +10:00.
        assert_eq!(format_iso_date(date), "2023-11-15");
    }

    #[test]
    fn timestamp_out_of_range_is_an_error() {
        assert!(timestamp_ms_to_date(i64::MAX, UtcOffset::UTC).is_err());
    }
}
