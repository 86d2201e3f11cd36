//! Window anchor resolution for paginated stats queries
//!
//! The stats API returns a fixed number of periods ending at a period
//! boundary. Mapping any requested date onto the anchor of the page that
//! contains it keeps "previous period" navigation on stable page boundaries
//! instead of drifting by one unit per step.

pub mod input;
pub mod range;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::models::{PeriodUnit, WeekStart};

pub use input::parse_date;
pub use range::{period_difference, period_range, shift_back, start_of_week, PeriodRange};

/// Resolve the anchor date of the window containing `raw_date`, using the
/// current time and ISO (Monday-start) weeks.
pub fn resolve_window_anchor(
    period: PeriodUnit,
    timezone_offset_minutes: i32,
    raw_date: &str,
    quantity: u32,
) -> ChartResult<String> {
    resolve_window_anchor_at(Utc::now(), period, timezone_offset_minutes, raw_date, quantity)
}

/// Same as [`resolve_window_anchor`] with an explicit "now"
pub fn resolve_window_anchor_at(
    now: DateTime<Utc>,
    period: PeriodUnit,
    timezone_offset_minutes: i32,
    raw_date: &str,
    quantity: u32,
) -> ChartResult<String> {
    let raw_date = parse_date(raw_date)?;
    let anchor = WindowResolver::default().anchor_at(
        now,
        period,
        timezone_offset_minutes,
        raw_date,
        quantity,
    )?;
    Ok(anchor.format("%Y-%m-%d").to_string())
}

/// Maps arbitrary dates onto aligned window anchors
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowResolver {
    week_start: WeekStart,
}

impl WindowResolver {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    /// Resolve the window anchor for `raw_date` as seen at instant `now`.
    ///
    /// The most recent window ends at the end of the period containing
    /// `now` in the caller's timezone. Older dates snap back by whole
    /// multiples of `quantity` periods, so for any `raw_date` up to the end
    /// of the current period the anchor `a` satisfies
    /// `a - quantity periods < raw_date <= a`. Later dates get the current
    /// window.
    pub fn anchor_at(
        &self,
        now: DateTime<Utc>,
        period: PeriodUnit,
        timezone_offset_minutes: i32,
        raw_date: NaiveDate,
        quantity: u32,
    ) -> ChartResult<NaiveDate> {
        if quantity == 0 {
            return Err(ChartError::InvalidArgument(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let today = local_date(now, timezone_offset_minutes)?;
        let end_of_period = period_range(period, today, self.week_start)?.end;
        let difference = period_difference(end_of_period, raw_date, period);
        let quantity = i64::from(quantity);

        if difference < quantity {
            debug!(%period, %raw_date, %end_of_period, "date is inside the current window");
            return Ok(end_of_period);
        }

        // difference >= quantity > 0 here, so the cast is lossless
        let steps = ((difference / quantity) * quantity) as u64;
        // Month subtraction clamps to the day of `end_of_period`, so land
        // on the last day of the shifted period
        let shifted = shift_back(end_of_period, period, steps)?;
        let anchor = period_range(period, shifted, self.week_start)?.end;

        debug!(
            %period,
            %raw_date,
            %end_of_period,
            %anchor,
            difference,
            "snapped window anchor"
        );

        Ok(anchor)
    }
}

/// Calendar date of `now` at a fixed UTC offset given in minutes east of UTC
pub fn local_date(now: DateTime<Utc>, timezone_offset_minutes: i32) -> ChartResult<NaiveDate> {
    let offset = timezone_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            ChartError::InvalidArgument(format!(
                "timezone offset of {timezone_offset_minutes} minutes is out of range"
            ))
        })?;

    Ok(now.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_date_returns_end_of_period() {
        let resolver = WindowResolver::default();
        let now = noon(2021, 3, 17);

        let anchor = resolver
            .anchor_at(now, PeriodUnit::Day, 0, ymd(2021, 3, 12), 7)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 3, 17));

        let anchor = resolver
            .anchor_at(now, PeriodUnit::Month, 0, ymd(2021, 1, 5), 12)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 3, 31));
    }

    #[test]
    fn test_old_date_snaps_to_window_multiple() {
        let resolver = WindowResolver::default();
        let now = noon(2021, 3, 17);

        // 10 days back with 7-day windows lands one window back
        let anchor = resolver
            .anchor_at(now, PeriodUnit::Day, 0, ymd(2021, 3, 7), 7)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 3, 10));

        // 15 days back lands two windows back
        let anchor = resolver
            .anchor_at(now, PeriodUnit::Day, 0, ymd(2021, 3, 2), 7)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 3, 3));
    }

    #[test]
    fn test_week_windows_end_on_sunday() {
        let resolver = WindowResolver::default();
        // Wednesday; the current ISO week ends Sunday 2021-03-21
        let now = noon(2021, 3, 17);

        let anchor = resolver
            .anchor_at(now, PeriodUnit::Week, 0, ymd(2021, 1, 1), 4)
            .unwrap();
        // 11 whole weeks back from 2021-03-21, snapped to 8
        assert_eq!(anchor, ymd(2021, 1, 24));
    }

    #[test]
    fn test_month_anchor_is_month_end_after_short_month() {
        let resolver = WindowResolver::default();

        // April has 30 days; the previous window must still end on March 31
        let anchor = resolver
            .anchor_at(noon(2021, 4, 15), PeriodUnit::Month, 0, ymd(2021, 3, 31), 1)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 3, 31));

        let anchor = resolver
            .anchor_at(noon(2021, 2, 10), PeriodUnit::Month, 0, ymd(2021, 1, 31), 1)
            .unwrap();
        assert_eq!(anchor, ymd(2021, 1, 31));

        let anchor = resolver
            .anchor_at(noon(2021, 2, 10), PeriodUnit::Month, 0, ymd(2020, 11, 30), 3)
            .unwrap();
        assert_eq!(anchor, ymd(2020, 11, 30));
        assert_eq!(
            resolver
                .anchor_at(noon(2021, 2, 10), PeriodUnit::Month, 0, anchor, 3)
                .unwrap(),
            anchor
        );
    }

    #[test]
    fn test_timezone_offset_moves_today() {
        let resolver = WindowResolver::default();
        let now = Utc.with_ymd_and_hms(2021, 3, 17, 23, 30, 0).unwrap();

        let utc = resolver
            .anchor_at(now, PeriodUnit::Day, 0, ymd(2021, 3, 17), 1)
            .unwrap();
        assert_eq!(utc, ymd(2021, 3, 17));

        let ahead = resolver
            .anchor_at(now, PeriodUnit::Day, 60, ymd(2021, 3, 18), 1)
            .unwrap();
        assert_eq!(ahead, ymd(2021, 3, 18));
    }

    #[test]
    fn test_rejects_zero_quantity_and_bad_offset() {
        let resolver = WindowResolver::default();
        let now = noon(2021, 3, 17);

        assert!(matches!(
            resolver.anchor_at(now, PeriodUnit::Day, 0, ymd(2021, 3, 1), 0),
            Err(ChartError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolver.anchor_at(now, PeriodUnit::Day, 24 * 60, ymd(2021, 3, 1), 7),
            Err(ChartError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_string_entry_point_formats_anchor() {
        let anchor =
            resolve_window_anchor_at(noon(2021, 3, 17), PeriodUnit::Year, 0, "2015-06-01", 3)
                .unwrap();
        // 6 whole years back from 2021-12-31
        assert_eq!(anchor, "2015-12-31");

        assert_eq!(
            resolve_window_anchor_at(noon(2021, 3, 17), PeriodUnit::Day, 0, "garbage", 3),
            Err(ChartError::InvalidDateInput("garbage".to_string()))
        );
    }
}
