use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FieldSet, PeriodUnit};

/// A single request against the stats API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Period unit the API buckets by
    pub unit: PeriodUnit,

    /// Window anchor, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Number of periods to return
    pub quantity: u32,

    /// Requested fields, serialized comma-joined
    pub stat_fields: FieldSet,
}

/// The two complementary requests issued for one chart render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPair {
    pub query: QueryDescriptor,
    pub supplemental_query: QueryDescriptor,
}
