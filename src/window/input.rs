use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{ChartError, ChartResult};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a caller supplied date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the calendar date is taken in
/// the timestamp's own offset) and naive `YYYY-MM-DDTHH:MM:SS` date-times.
pub fn parse_date(input: &str) -> ChartResult<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.date())
        .ok_or_else(|| ChartError::InvalidDateInput(input.to_string()))
}
