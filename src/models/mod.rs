pub mod metric;
pub mod period;
pub mod query;
pub mod record;

pub use metric::{FieldSet, MetricField};
pub use period::{PeriodUnit, WeekStart};
pub use query::{QueryDescriptor, QueryPair};
pub use record::{PeriodRecord, DEFAULT_KEY_FIELD};
