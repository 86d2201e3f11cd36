//! Merging of primary and supplemental stats results
//!
//! The primary query carries the fields the current chart tab needs and the
//! supplemental query carries the rest. Both come back as per-period
//! records; merging folds them into one record per period.

pub mod cache;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{ChartError, ChartResult};
use crate::models::{PeriodRecord, DEFAULT_KEY_FIELD};

pub use cache::{MergeCache, MergeKey};

/// Merge two result sets into one record per distinct key.
///
/// Output order is the primary order, followed by keys only the
/// supplemental set has, in their arrival order. When both sets report a
/// key, supplemental values fill in the record but a missing or null
/// supplemental value never replaces a primary one.
pub fn merge_query_results(
    primary: &[PeriodRecord],
    supplemental: &[PeriodRecord],
    key_field: &str,
) -> ChartResult<Vec<PeriodRecord>> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(primary.len());
    let mut merged: Vec<PeriodRecord> = Vec::with_capacity(primary.len());

    for record in primary {
        let key = record
            .key(key_field)
            .ok_or_else(|| ChartError::MissingKeyField(key_field.to_string()))?;

        match slots.get(key.as_ref()).copied() {
            Some(slot) => merged[slot] = record.clone(),
            None => {
                slots.insert(key.into_owned(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    for record in supplemental {
        let key = record
            .key(key_field)
            .ok_or_else(|| ChartError::MissingKeyField(key_field.to_string()))?;

        match slots.get(key.as_ref()).copied() {
            Some(slot) => merged[slot].absorb(record.clone()),
            None => {
                slots.insert(key.into_owned(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    Ok(merged)
}

/// Result merger with an optional content-keyed cache
#[derive(Debug, Clone)]
pub struct ResultMerger {
    key_field: String,
    cache: Option<MergeCache>,
}

impl Default for ResultMerger {
    fn default() -> Self {
        Self {
            key_field: DEFAULT_KEY_FIELD.to_string(),
            cache: None,
        }
    }
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            cache: MergeCache::from_config(&config.merge_cache),
            ..Self::default()
        }
    }

    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = key_field.into();
        self
    }

    pub fn with_cache(mut self, cache: MergeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn cache(&self) -> Option<&MergeCache> {
        self.cache.as_ref()
    }

    pub fn merge(
        &self,
        primary: &[PeriodRecord],
        supplemental: &[PeriodRecord],
    ) -> ChartResult<Arc<Vec<PeriodRecord>>> {
        let Some(cache) = &self.cache else {
            return self.merge_uncached(primary, supplemental).map(Arc::new);
        };

        let key = MergeCache::key_for(&self.key_field, primary, supplemental)?;
        if let Some(hit) = cache.get(&key) {
            trace!(records = hit.len(), "merge cache hit");
            return Ok(hit);
        }

        let merged = Arc::new(self.merge_uncached(primary, supplemental)?);
        cache.insert(key, Arc::clone(&merged));
        Ok(merged)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    fn merge_uncached(
        &self,
        primary: &[PeriodRecord],
        supplemental: &[PeriodRecord],
    ) -> ChartResult<Vec<PeriodRecord>> {
        let merged = merge_query_results(primary, supplemental, &self.key_field)?;
        debug!(
            primary = primary.len(),
            supplemental = supplemental.len(),
            merged = merged.len(),
            key_field = %self.key_field,
            "merged stats results"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn records(value: serde_json::Value) -> Vec<PeriodRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_supplemental_fills_without_clobbering() {
        let primary = records(json!([{ "period": "2020-01-01", "views": 10, "likes": null }]));
        let supplemental = records(json!([{ "period": "2020-01-01", "views": null, "likes": 5 }]));

        let merged = merge_query_results(&primary, &supplemental, "period").unwrap();
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!([{ "period": "2020-01-01", "views": 10, "likes": 5 }])
        );
    }

    #[test]
    fn test_key_union_keeps_first_appearance_order() {
        let primary = records(json!([{ "period": "p2" }, { "period": "p1" }]));
        let supplemental = records(json!([{ "period": "p3" }, { "period": "p1" }, { "period": "p4" }]));

        let merged = merge_query_results(&primary, &supplemental, "period").unwrap();
        let keys: Vec<_> = merged.iter().filter_map(|r| r.period.as_deref()).collect();
        assert_eq!(keys, vec!["p2", "p1", "p3", "p4"]);
    }

    #[test]
    fn test_duplicate_primary_key_keeps_first_position() {
        let primary = records(json!([
            { "period": "p1", "views": 1 },
            { "period": "p2", "views": 2 },
            { "period": "p1", "views": 3 }
        ]));

        let merged = merge_query_results(&primary, &[], "period").unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].views, Some(3));
        assert_eq!(merged[1].views, Some(2));
    }

    #[test]
    fn test_missing_key_field_is_an_error() {
        let primary = records(json!([{ "period": "p1" }]));
        let supplemental = records(json!([{ "views": 4 }]));

        assert_eq!(
            merge_query_results(&primary, &supplemental, "period"),
            Err(ChartError::MissingKeyField("period".to_string()))
        );
    }

    #[test]
    fn test_custom_key_field() {
        let primary = records(json!([{ "day": "mon", "views": 1 }]));
        let supplemental = records(json!([{ "day": "mon", "comments": 2 }, { "day": "tue" }]));

        let merged = ResultMerger::new()
            .with_key_field("day")
            .merge(&primary, &supplemental)
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].views, Some(1));
        assert_eq!(merged[0].comments, Some(2));
    }

    #[test]
    fn test_typed_metric_as_key_field() {
        let primary = records(json!([{ "period": "a", "views": 7 }]));
        let supplemental = records(json!([{ "views": 7, "likes": 1 }, { "views": 8 }]));

        let merged = merge_query_results(&primary, &supplemental, "views").unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].period.as_deref(), Some("a"));
        assert_eq!(merged[0].likes, Some(1));
        assert_eq!(merged[1].views, Some(8));

        assert_eq!(
            merge_query_results(&primary, &[], "post_titles"),
            Err(ChartError::MissingKeyField("post_titles".to_string()))
        );
    }

    #[test]
    fn test_cached_merger_reuses_entry_for_equal_inputs() {
        let cache = MergeCache::new(16, Duration::from_secs(60));
        let merger = ResultMerger::new().with_cache(cache.clone());

        let primary = records(json!([{ "period": "p1", "views": 1 }]));
        let supplemental = records(json!([{ "period": "p1", "likes": 2 }]));

        let first = merger.merge(&primary, &supplemental).unwrap();
        let second = merger.merge(&primary.clone(), &supplemental.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.entry_count(), 1);

        merger.clear_cache();
        let third = merger.merge(&primary, &supplemental).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
    }

    #[test]
    fn test_uncached_merger_recomputes() {
        let merger = ResultMerger::new();
        let primary = records(json!([{ "period": "p1", "views": 1 }]));

        let first = merger.merge(&primary, &[]).unwrap();
        let second = merger.merge(&primary, &[]).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert!(merger.cache().is_none());
    }
}
