//! Bar and line aggregation, ungrouped and grouped.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::types::{ChartSpec, Dataset};

use super::{ChartData, ChartPoint, Measure, group_key};

#[derive(Default)]
struct GroupAcc {
    sum: f64,
    valid: usize,
    records: usize,
}

/// One point per x-group, in first-encounter order, capped at
/// `category_max_groups`.
///
/// With a measure field the point is the mean of the group's valid values;
/// a group without any valid value falls back to its record count. In tally
/// mode every point is a count.
pub(super) fn aggregate_category(
    dataset: &Dataset,
    spec: &ChartSpec,
    x_field: &str,
    measure: Option<&str>,
    config: &AnalysisConfig,
) -> ChartData {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupAcc> = HashMap::new();

    for record in dataset.records() {
        let key = group_key(record.get(x_field), config);
        if !groups.contains_key(&key) {
            if order.len() >= config.category_max_groups {
                continue;
            }
            order.push(key.clone());
        }
        let acc = groups.entry(key).or_default();
        acc.records += 1;
        if let Some(v) = measure.and_then(|field| record.get(field).as_number()) {
            acc.sum += v;
            acc.valid += 1;
        }
    }

    let points = order
        .into_iter()
        .filter_map(|x| {
            let acc = groups.remove(&x)?;
            let measure = if measure.is_some() && acc.valid > 0 {
                Measure::Average(acc.sum / acc.valid as f64)
            } else {
                Measure::Count(acc.records)
            };
            Some(ChartPoint::Category { x, measure })
        })
        .collect();

    ChartData::from_points(spec, Vec::new(), points)
}

/// Pivot of x-group by series value.
///
/// Series are the first `max_series` distinct group values in record order;
/// records of any other group value are dropped. Every x-group seen in the
/// data produces a point, and cells exist only for series that occurred in
/// that x-group. Cells sum the measure (non-numeric values add zero) or
/// count records in tally mode.
pub(super) fn aggregate_grouped(
    dataset: &Dataset,
    spec: &ChartSpec,
    x_field: &str,
    group_field: &str,
    measure: Option<&str>,
    config: &AnalysisConfig,
) -> ChartData {
    let mut series: Vec<String> = Vec::new();
    let mut x_order: Vec<String> = Vec::new();
    let mut cells: HashMap<String, Vec<Option<f64>>> = HashMap::new();

    for record in dataset.records() {
        let x = group_key(record.get(x_field), config);
        if !cells.contains_key(&x) {
            x_order.push(x.clone());
        }
        let row = cells.entry(x).or_default();

        let g = group_key(record.get(group_field), config);
        let idx = match series.iter().position(|s| *s == g) {
            Some(idx) => idx,
            None if series.len() < config.max_series => {
                series.push(g);
                series.len() - 1
            }
            None => continue,
        };

        let contribution = match measure {
            Some(field) => record.get(field).as_number().unwrap_or(0.0),
            None => 1.0,
        };
        if row.len() <= idx {
            row.resize(idx + 1, None);
        }
        *row[idx].get_or_insert(0.0) += contribution;
    }

    let points = x_order
        .into_iter()
        .map(|x| {
            let row = cells.remove(&x).unwrap_or_default();
            let cells = row
                .into_iter()
                .zip(series.iter())
                .filter_map(|(cell, name)| cell.map(|v| (name.clone(), v)))
                .collect();
            ChartPoint::Grouped { x, cells }
        })
        .collect();

    ChartData::from_points(spec, series, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartType, Record, Value};

    fn sales() -> Dataset {
        let records = vec![
            Record::new().with("region", "North").with("sales", 10.0),
            Record::new().with("region", "North").with("sales", 30.0),
            Record::new().with("region", "South").with("sales", 20.0),
        ];
        Dataset::new(vec!["region".into(), "sales".into()], records).unwrap()
    }

    fn category(x: impl Into<String>, measure: Measure) -> ChartPoint {
        ChartPoint::Category { x: x.into(), measure }
    }

    // ==================== ungrouped tests ====================

    #[test]
    fn test_bar_averages_measure() {
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales");
        let data = aggregate_category(&sales(), &spec, "region", Some("sales"), &AnalysisConfig::default());

        assert_eq!(
            data.points(),
            &[
                category("North", Measure::Average(20.0)),
                category("South", Measure::Average(20.0)),
            ]
        );
    }

    #[test]
    fn test_bar_tally_counts_records() {
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("count");
        let data = aggregate_category(&sales(), &spec, "region", None, &AnalysisConfig::default());

        assert_eq!(
            data.points(),
            &[
                category("North", Measure::Count(2)),
                category("South", Measure::Count(1)),
            ]
        );
    }

    #[test]
    fn test_group_without_valid_measure_falls_back_to_count() {
        let records = vec![
            Record::new().with("region", "North").with("sales", 10.0),
            Record::new().with("region", "West").with("sales", "n/a"),
            Record::new().with("region", "West"),
        ];
        let ds = Dataset::new(vec!["region".into(), "sales".into()], records).unwrap();
        let spec = ChartSpec::new(ChartType::Line).x("region").y("sales");
        let data = aggregate_category(&ds, &spec, "region", Some("sales"), &AnalysisConfig::default());

        assert_eq!(
            data.points(),
            &[
                category("North", Measure::Average(10.0)),
                category("West", Measure::Count(2)),
            ]
        );
    }

    #[test]
    fn test_missing_x_maps_to_unknown_label() {
        let records = vec![
            Record::new().with("region", Value::Missing).with("sales", 4.0),
            Record::new().with("region", "").with("sales", 8.0),
            Record::new().with("region", 7).with("sales", 1.0),
        ];
        let ds = Dataset::new(vec!["region".into(), "sales".into()], records).unwrap();
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales");
        let data = aggregate_category(&ds, &spec, "region", Some("sales"), &AnalysisConfig::default());

        assert_eq!(
            data.points(),
            &[
                category("Unknown", Measure::Average(6.0)),
                category("7", Measure::Average(1.0)),
            ]
        );
    }

    #[test]
    fn test_category_cap_keeps_first_groups() {
        let records = (0..30)
            .map(|i| Record::new().with("k", format!("g{i}")).with("v", 1.0))
            .collect();
        let ds = Dataset::new(vec!["k".into(), "v".into()], records).unwrap();
        let spec = ChartSpec::new(ChartType::Bar).x("k").y("v");
        let data = aggregate_category(&ds, &spec, "k", Some("v"), &AnalysisConfig::default());

        assert_eq!(data.points().len(), 20);
        assert_eq!(data.points()[0], category("g0", Measure::Average(1.0)));
        assert_eq!(data.points()[19], category("g19", Measure::Average(1.0)));
    }

    #[test]
    fn test_capped_groups_still_receive_later_records() {
        let records = vec![
            Record::new().with("k", "a").with("v", 1.0),
            Record::new().with("k", "b").with("v", 1.0),
            Record::new().with("k", "c").with("v", 1.0),
            Record::new().with("k", "a").with("v", 3.0),
        ];
        let ds = Dataset::new(vec!["k".into(), "v".into()], records).unwrap();
        let config = AnalysisConfig::builder().category_max_groups(2).build().unwrap();
        let spec = ChartSpec::new(ChartType::Bar).x("k").y("v");
        let data = aggregate_category(&ds, &spec, "k", Some("v"), &config);

        assert_eq!(
            data.points(),
            &[category("a", Measure::Average(2.0)), category("b", Measure::Average(1.0))]
        );
    }

    // ==================== grouped tests ====================

    fn grouped_sales() -> Dataset {
        let records = vec![
            Record::new().with("region", "North").with("product", "A").with("sales", 10.0),
            Record::new().with("region", "North").with("product", "B").with("sales", 5.0),
            Record::new().with("region", "South").with("product", "A").with("sales", 7.0),
            Record::new().with("region", "North").with("product", "A").with("sales", 2.0),
            Record::new().with("region", "East").with("product", "C").with("sales", "x"),
        ];
        Dataset::new(
            vec!["region".into(), "product".into(), "sales".into()],
            records,
        )
        .unwrap()
    }

    #[test]
    fn test_grouped_sums_cells() {
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales").group("product");
        let data = aggregate_grouped(
            &grouped_sales(),
            &spec,
            "region",
            "product",
            Some("sales"),
            &AnalysisConfig::default(),
        );

        assert_eq!(data.series(), &["A", "B", "C"]);
        assert_eq!(
            data.points(),
            &[
                ChartPoint::Grouped {
                    x: "North".into(),
                    cells: vec![("A".into(), 12.0), ("B".into(), 5.0)],
                },
                ChartPoint::Grouped {
                    x: "South".into(),
                    cells: vec![("A".into(), 7.0)],
                },
                ChartPoint::Grouped {
                    x: "East".into(),
                    cells: vec![("C".into(), 0.0)],
                },
            ]
        );
    }

    #[test]
    fn test_grouped_tally_counts() {
        let spec = ChartSpec::new(ChartType::Bar).x("region").group("product");
        let data = aggregate_grouped(
            &grouped_sales(),
            &spec,
            "region",
            "product",
            None,
            &AnalysisConfig::default(),
        );

        assert_eq!(
            data.points()[0],
            ChartPoint::Grouped {
                x: "North".into(),
                cells: vec![("A".into(), 2.0), ("B".into(), 1.0)],
            }
        );
    }

    #[test]
    fn test_series_limit_drops_later_group_values() {
        let config = AnalysisConfig::builder().max_series(2).build().unwrap();
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales").group("product");
        let data = aggregate_grouped(&grouped_sales(), &spec, "region", "product", Some("sales"), &config);

        assert_eq!(data.series(), &["A", "B"]);
        // East only holds records of the dropped series
        assert_eq!(
            data.points()[2],
            ChartPoint::Grouped {
                x: "East".into(),
                cells: vec![],
            }
        );
        for point in data.points() {
            if let ChartPoint::Grouped { cells, .. } = point {
                assert!(cells.iter().all(|(name, _)| name != "C"));
            }
        }
    }
}
