//! Primary / supplemental query construction

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::config::Config;
use crate::error::{ChartError, ChartResult};
use crate::models::{FieldSet, MetricField, PeriodUnit, QueryDescriptor, QueryPair};
use crate::window::WindowResolver;

/// Fields fetched in the primary query for a chart tab.
///
/// The views tab charts visitors alongside views, so both are primary.
pub fn primary_fields(chart_tab: MetricField) -> FieldSet {
    match chart_tab {
        MetricField::Views => [MetricField::Views, MetricField::Visitors]
            .into_iter()
            .collect(),
        other => [other].into_iter().collect(),
    }
}

/// Split the metric universe into a primary query for the chart tab and a
/// supplemental query for everything else.
///
/// `date` is used as-is; resolve it to a window anchor first (see
/// [`QueryPlanner`] for the combined flow).
pub fn generate_queries(
    period: PeriodUnit,
    date: NaiveDate,
    quantity: u32,
    chart_tab: MetricField,
) -> ChartResult<QueryPair> {
    if quantity == 0 {
        return Err(ChartError::InvalidArgument(
            "quantity must be a positive integer".to_string(),
        ));
    }

    let stat_fields = primary_fields(chart_tab);
    let base = QueryDescriptor {
        unit: period,
        date,
        quantity,
        stat_fields,
    };

    Ok(QueryPair {
        supplemental_query: QueryDescriptor {
            stat_fields: stat_fields.complement(),
            ..base.clone()
        },
        query: base,
    })
}

/// Resolves the window anchor and builds both queries in one step
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner {
    resolver: WindowResolver,
    timezone_offset_minutes: i32,
}

impl QueryPlanner {
    pub fn new(resolver: WindowResolver, timezone_offset_minutes: i32) -> Self {
        Self {
            resolver,
            timezone_offset_minutes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WindowResolver::new(config.calendar.week_start),
            config.calendar.timezone_offset_minutes,
        )
    }

    pub fn with_timezone_offset(mut self, timezone_offset_minutes: i32) -> Self {
        self.timezone_offset_minutes = timezone_offset_minutes;
        self
    }

    pub fn plan(
        &self,
        period: PeriodUnit,
        raw_date: NaiveDate,
        quantity: u32,
        chart_tab: MetricField,
    ) -> ChartResult<QueryPair> {
        self.plan_at(Utc::now(), period, raw_date, quantity, chart_tab)
    }

    pub fn plan_at(
        &self,
        now: DateTime<Utc>,
        period: PeriodUnit,
        raw_date: NaiveDate,
        quantity: u32,
        chart_tab: MetricField,
    ) -> ChartResult<QueryPair> {
        let anchor = self.resolver.anchor_at(
            now,
            period,
            self.timezone_offset_minutes,
            raw_date,
            quantity,
        )?;
        let queries = generate_queries(period, anchor, quantity, chart_tab)?;

        debug!(
            %period,
            %anchor,
            primary = %queries.query.stat_fields,
            supplemental = %queries.supplemental_query.stat_fields,
            "planned stats queries"
        );

        Ok(queries)
    }
}
