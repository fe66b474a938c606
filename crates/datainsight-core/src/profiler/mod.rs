//! Data profiling module for dataset analysis.
//!
//! This module provides:
//! - Column type inference (numeric vs categorical) from a leading sample
//! - Descriptive statistics for numeric columns
//! - Missing-value counts for every column

mod statistics;
mod type_inference;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{Column, ColumnStats, Dataset};

pub(crate) use type_inference::infer_column_types;

/// Headline numbers of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub total_missing: usize,
}

/// Result of profiling a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    /// Columns in dataset order with their inferred types.
    pub columns: Vec<Column>,
    /// Statistics of numeric columns that have at least one valid value.
    pub column_stats: BTreeMap<String, ColumnStats>,
    /// Missing-value count of every column.
    pub missing_values: BTreeMap<String, usize>,
    pub overview: DatasetOverview,
}

impl DatasetProfile {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_numeric())
    }
}

/// Data profiler for analyzing dataset structure and statistics.
pub struct DataProfiler;

impl DataProfiler {
    /// Classify every column of the dataset.
    pub fn classify(dataset: &Dataset, config: &AnalysisConfig) -> Vec<Column> {
        infer_column_types(dataset, config.inference_sample_rows)
    }

    /// Profile an entire dataset: classification, statistics and missing counts.
    pub fn profile_dataset(dataset: &Dataset, config: &AnalysisConfig) -> DatasetProfile {
        let columns = Self::classify(dataset, config);
        Self::profile_with_columns(dataset, columns)
    }

    /// Profile a dataset against an already computed classification.
    pub fn profile_with_columns(dataset: &Dataset, columns: Vec<Column>) -> DatasetProfile {
        let stats = statistics::compute_descriptive_stats(dataset, &columns);

        let numeric_columns = columns.iter().filter(|c| c.is_numeric()).count();
        let overview = DatasetOverview {
            total_rows: dataset.len(),
            total_columns: columns.len(),
            numeric_columns,
            categorical_columns: columns.len() - numeric_columns,
            total_missing: stats.missing_values.values().sum(),
        };

        debug!(
            "Profiled dataset v{}: {} rows, {} numeric / {} categorical columns",
            dataset.version(),
            overview.total_rows,
            overview.numeric_columns,
            overview.categorical_columns
        );

        DatasetProfile {
            columns,
            column_stats: stats.column_stats,
            missing_values: stats.missing_values,
            overview,
        }
    }
}
