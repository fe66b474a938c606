//! Scatter aggregation.

use crate::config::AnalysisConfig;
use crate::types::{ChartSpec, Dataset};

use super::{ChartData, ChartPoint};

/// Pairs of records where both axes hold finite numbers, in record order,
/// capped at `scatter_max_points`. Records with either value missing or
/// unparseable are skipped.
pub(super) fn aggregate_scatter(
    dataset: &Dataset,
    spec: &ChartSpec,
    x_field: &str,
    y_field: &str,
    config: &AnalysisConfig,
) -> ChartData {
    let points = dataset
        .records()
        .iter()
        .filter_map(|record| {
            let x = record.get(x_field).as_number()?;
            let y = record.get(y_field).as_number()?;
            Some(ChartPoint::Scatter { x, y })
        })
        .take(config.scatter_max_points)
        .collect();

    ChartData::from_points(spec, Vec::new(), points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::EmptyReason;
    use crate::types::{ChartType, Record, Value};

    fn spec() -> ChartSpec {
        ChartSpec::new(ChartType::Scatter).x("a").y("b")
    }

    #[test]
    fn test_scatter_skips_invalid_pairs() {
        let records = vec![
            Record::new().with("a", 1.0).with("b", 2.0),
            Record::new().with("a", "x").with("b", 3.0),
            Record::new().with("a", 4.0).with("b", Value::Missing),
            Record::new().with("a", "5").with("b", 6.0),
        ];
        let ds = Dataset::new(vec!["a".into(), "b".into()], records).unwrap();
        let data = aggregate_scatter(&ds, &spec(), "a", "b", &AnalysisConfig::default());

        assert_eq!(
            data.points(),
            &[
                ChartPoint::Scatter { x: 1.0, y: 2.0 },
                ChartPoint::Scatter { x: 5.0, y: 6.0 },
            ]
        );
    }

    #[test]
    fn test_scatter_caps_points_in_record_order() {
        let records = (0..250)
            .map(|i| Record::new().with("a", i).with("b", i * 2))
            .collect();
        let ds = Dataset::new(vec!["a".into(), "b".into()], records).unwrap();
        let data = aggregate_scatter(&ds, &spec(), "a", "b", &AnalysisConfig::default());

        assert_eq!(data.points().len(), 100);
        assert_eq!(data.points()[99], ChartPoint::Scatter { x: 99.0, y: 198.0 });
    }

    #[test]
    fn test_scatter_without_valid_pairs_is_empty() {
        let records = vec![Record::new().with("a", 1.0)];
        let ds = Dataset::new(vec!["a".into(), "b".into()], records).unwrap();
        let data = aggregate_scatter(&ds, &spec(), "a", "b", &AnalysisConfig::default());

        assert_eq!(data.empty_reason(), Some(&EmptyReason::NoQualifyingRecords));
    }
}
