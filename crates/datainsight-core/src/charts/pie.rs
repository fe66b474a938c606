//! Pie aggregation.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::types::{ChartSpec, Dataset};

use super::{ChartData, ChartPoint, group_key};

/// Sum the measure (or count records) per x-group, then keep the
/// `pie_top_n` largest slices.
///
/// The sort is stable, so equal slices stay in first-encounter order.
/// Non-numeric measure values contribute zero.
pub(super) fn aggregate_pie(
    dataset: &Dataset,
    spec: &ChartSpec,
    x_field: &str,
    measure: Option<&str>,
    config: &AnalysisConfig,
) -> ChartData {
    let mut slices: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in dataset.records() {
        let name = group_key(record.get(x_field), config);
        let contribution = match measure {
            Some(field) => record.get(field).as_number().unwrap_or(0.0),
            None => 1.0,
        };
        let idx = *index.entry(name.clone()).or_insert_with(|| {
            slices.push((name, 0.0));
            slices.len() - 1
        });
        slices[idx].1 += contribution;
    }

    slices.sort_by(|a, b| b.1.total_cmp(&a.1));
    slices.truncate(config.pie_top_n);

    let points = slices
        .into_iter()
        .map(|(name, value)| ChartPoint::Slice { name, value })
        .collect();

    ChartData::from_points(spec, Vec::new(), points)
}
