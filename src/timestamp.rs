//! Normalizing schedule dates and times into canonical timestamps.
//!
//! Canonical timestamps look like `2020-05-27T15:00:00.000Z`. The source data
//! has no seconds and no time zone, so milliseconds are always zero and the
//! time is labelled UTC as the record store expects.

use crate::errors::TimeFormatError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Date format of the date-slot column headers, e.g. `5/27/20`.
pub const SLOT_DATE_FORMAT: &str = "%m/%d/%y";
/// Canonical calendar date, e.g. `2020-05-27`.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";
/// Time of day after whitespace removal, e.g. `3:00PM`.
pub const TIME_FORMAT: &str = "%I:%M%p";
/// Combined date and 24-hour time, e.g. `5/27/20 15:00`.
pub const DATETIME_FORMAT: &str = "%m/%d/%y %H:%M";

fn time_format_error(value: &str, expected: &'static str) -> TimeFormatError {
    TimeFormatError {
        value: value.to_owned(),
        expected,
    }
}

/// Parse a date-slot key such as `5/27/20`.
pub fn parse_slot_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), SLOT_DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Parse a 12-hour time such as `3:00PM` or `3: 00 pm`.
/// All whitespace is ignored.
pub fn parse_time(raw: &str) -> Result<NaiveTime, TimeFormatError> {
    let clean: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    NaiveTime::parse_from_str(&clean, TIME_FORMAT)
        .map_err(|_| time_format_error(raw, "a 12-hour time like 3:00PM"))
}

/// Combine a date and a time of day into a canonical timestamp.
pub fn timestamp(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}T{}.000Z", canonical_date(date), time.format("%H:%M:%S"))
}

/// Normalize a canonical date (`YYYY-MM-DD`) and a raw 12-hour time into a
/// canonical timestamp.
pub fn normalize(canonical: &str, raw_time: &str) -> Result<String, TimeFormatError> {
    let date = NaiveDate::parse_from_str(canonical, CANONICAL_DATE_FORMAT)
        .map_err(|_| time_format_error(canonical, "a date like 2020-05-27"))?;
    Ok(timestamp(date, parse_time(raw_time)?))
}

/// Normalize a combined date and 24-hour time such as `5/27/20 15:00`.
pub fn normalize_datetime(raw: &str) -> Result<String, TimeFormatError> {
    let dt = NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT)
        .map_err(|_| time_format_error(raw, "a date and time like 5/27/20 15:00"))?;
    Ok(timestamp(dt.date(), dt.time()))
}
