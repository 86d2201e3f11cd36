//! Axis labels for a period / date pair

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::models::PeriodUnit;
use crate::window::parse_date;

/// Label a date for a period given by name.
///
/// `period` must be exactly one of `day`, `week`, `month` or `year`.
/// Returns `None` for any other period name or when the date does not
/// parse; callers treat that as "no label available".
pub fn format_date(date: &str, period: &str) -> Option<String> {
    let unit = match period {
        "day" => PeriodUnit::Day,
        "week" => PeriodUnit::Week,
        "month" => PeriodUnit::Month,
        "year" => PeriodUnit::Year,
        _ => return None,
    };

    match parse_date(date) {
        Ok(parsed) => Some(format_period(parsed, unit)),
        Err(err) => {
            debug!(%err, "no label for unparseable date");
            None
        }
    }
}

/// Label a date for a period.
///
/// - day: `March 15, 2021`
/// - week: `03/15/2021 - 03/21/2021`, the date itself and six days later
/// - month: `March 2021`
/// - year: `2021`
pub fn format_period(date: NaiveDate, period: PeriodUnit) -> String {
    match period {
        PeriodUnit::Day => date.format("%B %-d, %Y").to_string(),
        PeriodUnit::Week => {
            // Past the last representable week there is no end day to print
            let end = date.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            format!("{} - {}", date.format("%m/%d/%Y"), end.format("%m/%d/%Y"))
        }
        PeriodUnit::Month => date.format("%B %Y").to_string(),
        PeriodUnit::Year => date.format("%Y").to_string(),
    }
}
