pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod models;
pub mod query;
pub mod window;

pub use error::{ChartError, ChartResult};
pub use format::{format_date, format_period};
pub use merge::{merge_query_results, MergeCache, ResultMerger};
pub use models::{
    FieldSet, MetricField, PeriodRecord, PeriodUnit, QueryDescriptor, QueryPair, WeekStart,
};
pub use query::{generate_queries, QueryPlanner};
pub use window::{resolve_window_anchor, resolve_window_anchor_at, WindowResolver};
