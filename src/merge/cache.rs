use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::config::MergeCacheConfig;
use crate::error::{ChartError, ChartResult};
use crate::models::PeriodRecord;

/// SHA-256 digest of a merge call's inputs
pub type MergeKey = [u8; 32];

/// Bounded cache of merged series.
///
/// Entries are keyed by the content of the inputs, not their identity, so
/// two deep-equal calls share one entry. Clones share the same storage.
#[derive(Clone)]
pub struct MergeCache {
    entries: Cache<MergeKey, Arc<Vec<PeriodRecord>>>,
}

impl MergeCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    /// Build a cache from configuration, or `None` when caching is disabled
    pub fn from_config(config: &MergeCacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.max_entries, Duration::from_secs(config.ttl_secs)))
    }

    /// Digest of the canonical JSON of `(key_field, primary, supplemental)`
    pub fn key_for(
        key_field: &str,
        primary: &[PeriodRecord],
        supplemental: &[PeriodRecord],
    ) -> ChartResult<MergeKey> {
        let encode = |records: &[PeriodRecord]| {
            serde_json::to_vec(records).map_err(|e| {
                ChartError::InvalidArgument(format!("failed to encode records: {e}"))
            })
        };

        let mut hasher = Sha256::new();
        hasher.update(key_field.as_bytes());
        hasher.update([0u8]);
        hasher.update(encode(primary)?);
        hasher.update([0u8]);
        hasher.update(encode(supplemental)?);

        Ok(hasher.finalize().into())
    }

    pub fn get(&self, key: &MergeKey) -> Option<Arc<Vec<PeriodRecord>>> {
        self.entries.get(key)
    }

    pub fn insert(&self, key: MergeKey, merged: Arc<Vec<PeriodRecord>>) {
        self.entries.insert(key, merged);
    }

    /// Drop every cached series
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of live entries after pending maintenance has run
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl std::fmt::Debug for MergeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
