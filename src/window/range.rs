//! Calendar arithmetic on period boundaries

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::error::{ChartError, ChartResult};
use crate::models::{PeriodUnit, WeekStart};

/// The period containing a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRange {
    pub period: PeriodUnit,

    /// First day of the period
    pub start: NaiveDate,

    /// Last day of the period
    pub end: NaiveDate,

    /// Stable identifier, `<unit>:<end YYYY-MM-DD>`
    pub key: String,
}

/// Compute the day/week/month/year containing `date`
pub fn period_range(
    period: PeriodUnit,
    date: NaiveDate,
    week_start: WeekStart,
) -> ChartResult<PeriodRange> {
    let (start, end) = match period {
        PeriodUnit::Day => (date, date),
        PeriodUnit::Week => {
            let start = start_of_week(date, week_start);
            let end = start
                .checked_add_days(Days::new(6))
                .ok_or_else(|| out_of_range(date))?;
            (start, end)
        }
        PeriodUnit::Month => {
            let start = date.with_day(1).ok_or_else(|| out_of_range(date))?;
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .ok_or_else(|| out_of_range(date))?;
            (start, end)
        }
        PeriodUnit::Year => {
            let start = date.with_ordinal(1).ok_or_else(|| out_of_range(date))?;
            let end = NaiveDate::from_ymd_opt(date.year(), 12, 31)
                .ok_or_else(|| out_of_range(date))?;
            (start, end)
        }
    };

    Ok(PeriodRange {
        period,
        start,
        end,
        key: format!("{}:{}", period, end.format("%Y-%m-%d")),
    })
}

pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let days_into_week = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date - Days::new(u64::from(days_into_week))
}

/// Whole `period` units from `earlier` to `later`, truncated toward zero.
///
/// Month and year counts follow the calendar: adding the result to
/// `earlier` (clamping to month end) never passes `later`.
pub fn period_difference(later: NaiveDate, earlier: NaiveDate, period: PeriodUnit) -> i64 {
    match period {
        PeriodUnit::Day => (later - earlier).num_days(),
        PeriodUnit::Week => (later - earlier).num_days() / 7,
        PeriodUnit::Month => whole_months_between(earlier, later),
        PeriodUnit::Year => whole_months_between(earlier, later) / 12,
    }
}

/// Step `count` periods back from `date`
pub fn shift_back(date: NaiveDate, period: PeriodUnit, count: u64) -> ChartResult<NaiveDate> {
    let shifted = match period {
        PeriodUnit::Day => date.checked_sub_days(Days::new(count)),
        PeriodUnit::Week => count
            .checked_mul(7)
            .and_then(|days| date.checked_sub_days(Days::new(days))),
        PeriodUnit::Month => u32::try_from(count)
            .ok()
            .and_then(|months| date.checked_sub_months(Months::new(months))),
        PeriodUnit::Year => count
            .checked_mul(12)
            .and_then(|months| u32::try_from(months).ok())
            .and_then(|months| date.checked_sub_months(Months::new(months))),
    };

    shifted.ok_or_else(|| out_of_range(date))
}

fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -whole_months_between(to, from);
    }

    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());

    while months > 0 {
        let landed = u32::try_from(months)
            .ok()
            .and_then(|m| from.checked_add_months(Months::new(m)));
        match landed {
            Some(date) if date <= to => break,
            _ => months -= 1,
        }
    }

    months
}

fn out_of_range(date: NaiveDate) -> ChartError {
    ChartError::InvalidArgument(format!("date {date} is outside the supported calendar range"))
}
