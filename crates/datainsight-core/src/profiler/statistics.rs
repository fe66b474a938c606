//! Descriptive statistics and missing-value counting.

use std::collections::BTreeMap;

use crate::types::{Column, ColumnStats, Dataset};

/// Valid numeric values of a column, in record order.
pub(crate) fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .records()
        .iter()
        .filter_map(|record| record.get(column).as_number())
        .collect()
}

/// Number of records where the field is absent, null or empty.
pub(crate) fn count_missing(dataset: &Dataset, column: &str) -> usize {
    dataset
        .records()
        .iter()
        .filter(|record| record.get(column).is_missing())
        .count()
}

/// Compute mean, extrema and population standard deviation.
///
/// Returns `None` for an empty slice rather than NaN statistics.
pub(crate) fn compute_column_stats(values: &[f64]) -> Option<ColumnStats> {
    let mean = crate::utils::mean(values)?;
    let n = values.len() as f64;

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(ColumnStats {
        // rounding in the sum can push the mean a hair past an extreme
        mean: mean.clamp(min, max),
        min,
        max,
        count: values.len(),
        std_dev: variance.sqrt(),
    })
}

/// Statistics of every numeric column plus missing counts of every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DescriptiveStats {
    pub column_stats: BTreeMap<String, ColumnStats>,
    pub missing_values: BTreeMap<String, usize>,
}

pub(crate) fn compute_descriptive_stats(dataset: &Dataset, columns: &[Column]) -> DescriptiveStats {
    let mut result = DescriptiveStats::default();

    for column in columns {
        result
            .missing_values
            .insert(column.name.clone(), count_missing(dataset, &column.name));

        if !column.is_numeric() {
            continue;
        }

        match compute_column_stats(&numeric_values(dataset, &column.name)) {
            Some(stats) => {
                result.column_stats.insert(column.name.clone(), stats);
            }
            None => {
                tracing::debug!("Column '{}' has no valid numeric values", column.name);
            }
        }
    }

    result
}
