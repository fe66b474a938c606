//! Memoization of chart aggregations.
//!
//! An aggregation depends on the dataset contents, the chart spec, the
//! chart-shaping part of the configuration ([`ChartBounds`]) and the inferred
//! types of the spec's axes. Every [`Dataset`] carries a version that changes
//! whenever a new dataset is constructed, so the cache is keyed by all four
//! and never needs explicit invalidation for correctness;
//! [`ChartCache::evict_dataset`] only frees memory. Sessions with different
//! configurations can share one cache.
//!
//! # Thread Safety
//!
//! Entries live behind a `parking_lot::Mutex`, so a shared cache can serve
//! several threads. The lock is not held while aggregating.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::config::{AnalysisConfig, ChartBounds};
use crate::types::{ChartSpec, Column, ColumnType, Dataset};

use super::ChartData;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChartKey {
    version: u64,
    spec: ChartSpec,
    bounds: ChartBounds,
    /// Inferred types of the x and measure fields.
    axis_types: [Option<ColumnType>; 2],
}

impl ChartKey {
    fn new(dataset: &Dataset, spec: &ChartSpec, config: &AnalysisConfig, columns: &[Column]) -> Self {
        let type_of = |field: Option<&str>| {
            field.and_then(|f| columns.iter().find(|c| c.name == f).map(|c| c.column_type))
        };
        Self {
            version: dataset.version(),
            spec: spec.clone(),
            bounds: config.chart_bounds(),
            axis_types: [type_of(spec.x_field.as_deref()), type_of(spec.measure_field())],
        }
    }
}

/// Cache of aggregated charts keyed by dataset version, chart spec, chart
/// bounds and axis types.
#[derive(Debug)]
pub struct ChartCache {
    entries: Mutex<HashMap<ChartKey, ChartData>>,
    capacity: usize,
}

static_assertions::assert_impl_all!(ChartCache: Send, Sync);

impl Default for ChartCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` charts. When full, the cache is
    /// cleared before the next insert.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Return the cached chart for `spec` over `dataset` as aggregated under
    /// `config` with the column classification `columns`, computing and
    /// storing it on a miss.
    pub fn get_or_compute<F>(
        &self,
        dataset: &Dataset,
        spec: &ChartSpec,
        config: &AnalysisConfig,
        columns: &[Column],
        compute: F,
    ) -> ChartData
    where
        F: FnOnce() -> ChartData,
    {
        let key = ChartKey::new(dataset, spec, config, columns);
        if let Some(hit) = self.entries.lock().get(&key) {
            tracing::trace!("Chart cache hit for dataset v{}", key.version);
            return hit.clone();
        }

        let data = compute();

        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            tracing::debug!("Chart cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, data.clone());
        data
    }

    /// Drop every chart computed for the given dataset version.
    pub fn evict_dataset(&self, version: u64) {
        self.entries.lock().retain(|key, _| key.version != version);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
