use crate::error::app_error::AppError;
use chrono::{NaiveDate, NaiveTime};

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| AppError::InvalidInput(format!("Invalid date '{raw}': {err}")))
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|err| AppError::InvalidInput(format!("Invalid time '{raw}': {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates() {
        assert_eq!(parse_date("2026-10-26").unwrap(), NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        assert_eq!(parse_date(" 2026-02-01 ").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn malformed_dates_are_invalid_input() {
        for raw in ["2026-02-30", "26/10/2026", "", "tomorrow"] {
            assert!(matches!(parse_date(raw), Err(AppError::InvalidInput(_))), "{raw}");
        }
    }

    #[test]
    fn parses_times() {
        assert_eq!(parse_time("13:30").unwrap(), NaiveTime::from_hms_opt(13, 30, 0).unwrap());
        assert_eq!(parse_time("08:05:30").unwrap(), NaiveTime::from_hms_opt(8, 5, 30).unwrap());
        assert!(matches!(parse_time("25:00"), Err(AppError::InvalidInput(_))));
    }
}
