//! Bounded, serializable dataset summaries for the narrative generator.
//!
//! A [`ContextSummary`] is the payload sent to a language model together with
//! an instruction. It carries dataset shape, numeric statistics, a handful of
//! leading records and a few sample values per column, and nothing else, so
//! its size is independent of the dataset's row count.

pub mod prompt;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profiler::DatasetProfile;
use crate::types::{Column, ColumnStats, ColumnType, Dataset, Value};

/// One sample record, serialized as an object in dataset column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord(pub Vec<(String, Value)>);

impl SampleRecord {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }
}

impl Serialize for SampleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Numeric column statistics in dataset column order, serialized as an object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedStats(pub Vec<(String, ColumnStats)>);

impl OrderedStats {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.0.iter().find(|(name, _)| name == column).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ColumnStats)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OrderedStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, stats) in &self.0 {
            map.serialize_entry(name, stats)?;
        }
        map.end()
    }
}

/// Type and sample values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTypeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Values of the leading records, missing ones included as `null`.
    pub sample_values: Vec<Value>,
}

/// Summary of a dataset bounded by the configured sample sizes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub total_records: usize,
    pub column_count: usize,
    pub numeric_column_count: usize,
    pub categorical_column_count: usize,
    pub column_stats: OrderedStats,
    pub sample_records: Vec<SampleRecord>,
    pub column_types: Vec<ColumnTypeInfo>,
}

impl ContextSummary {
    /// Column names in dataset order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.column_types.iter().map(|c| c.name.as_str())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds [`ContextSummary`] values.
pub struct ContextSummaryBuilder<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ContextSummaryBuilder<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Summarize a dataset from a finished profile.
    pub fn from_profile(&self, dataset: &Dataset, profile: &DatasetProfile) -> ContextSummary {
        self.build(dataset, &profile.columns, &profile.column_stats)
    }

    /// Summarize a dataset from its classification and numeric statistics.
    pub fn build(
        &self,
        dataset: &Dataset,
        columns: &[Column],
        column_stats: &BTreeMap<String, ColumnStats>,
    ) -> ContextSummary {
        let numeric_column_count = columns.iter().filter(|c| c.is_numeric()).count();

        let sample_records = dataset
            .records()
            .iter()
            .take(self.config.context_sample_records)
            .map(|record| {
                SampleRecord(
                    dataset
                        .columns()
                        .iter()
                        .map(|name| (name.clone(), record.get(name).clone()))
                        .collect(),
                )
            })
            .collect::<Vec<_>>();

        let column_types = columns
            .iter()
            .map(|column| ColumnTypeInfo {
                name: column.name.clone(),
                column_type: column.column_type,
                sample_values: dataset
                    .records()
                    .iter()
                    .take(self.config.context_column_samples)
                    .map(|record| record.get(&column.name).clone())
                    .collect(),
            })
            .collect();

        debug!(
            "Built context summary: {} sample records, {} columns",
            sample_records.len(),
            columns.len()
        );

        ContextSummary {
            total_records: dataset.len(),
            column_count: columns.len(),
            numeric_column_count,
            categorical_column_count: columns.len() - numeric_column_count,
            column_stats: OrderedStats(
                columns
                    .iter()
                    .filter_map(|c| column_stats.get(&c.name).map(|s| (c.name.clone(), *s)))
                    .collect(),
            ),
            sample_records,
            column_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::DataProfiler;
    use crate::types::Record;
    use serde_json::json;

    fn dataset(rows: usize) -> Dataset {
        let records = (0..rows)
            .map(|i| {
                let region = if i % 2 == 0 { "North" } else { "South" };
                Record::new().with("region", region).with("sales", (i * 10) as f64)
            })
            .collect();
        Dataset::new(vec!["region".into(), "sales".into()], records).unwrap()
    }

    fn summarize(ds: &Dataset) -> ContextSummary {
        let config = AnalysisConfig::default();
        let profile = DataProfiler::profile_dataset(ds, &config);
        ContextSummaryBuilder::new(&config).from_profile(ds, &profile)
    }

    #[test]
    fn test_summary_is_bounded() {
        let summary = summarize(&dataset(1000));

        assert_eq!(summary.total_records, 1000);
        assert_eq!(summary.sample_records.len(), 5);
        assert!(summary.column_types.iter().all(|c| c.sample_values.len() == 3));
    }

    #[test]
    fn test_summary_counts_and_types() {
        let summary = summarize(&dataset(4));

        assert_eq!(summary.column_count, 2);
        assert_eq!(summary.numeric_column_count, 1);
        assert_eq!(summary.categorical_column_count, 1);
        assert_eq!(summary.column_types[0].column_type, ColumnType::Categorical);
        assert_eq!(summary.column_types[1].column_type, ColumnType::Numeric);
        assert_eq!(summary.column_stats.get("sales").unwrap().max, 30.0);
        assert_eq!(summary.column_names().collect::<Vec<_>>(), vec!["region", "sales"]);
    }

    #[test]
    fn test_small_dataset_samples_everything() {
        let summary = summarize(&dataset(2));
        assert_eq!(summary.sample_records.len(), 2);
        assert_eq!(summary.column_types[0].sample_values.len(), 2);
    }

    #[test]
    fn test_missing_sample_values_are_kept_as_null() {
        let records = vec![
            Record::new().with("a", 1.0).with("b", "x"),
            Record::new().with("a", 2.0),
        ];
        let ds = Dataset::new(vec!["a".into(), "b".into()], records).unwrap();
        let summary = summarize(&ds);

        assert_eq!(summary.column_types[1].sample_values, vec![Value::text("x"), Value::Missing]);
        assert_eq!(summary.sample_records[1].get("b"), Some(&Value::Missing));
    }

    #[test]
    fn test_summary_serialization_shape() {
        let records = vec![Record::new().with("region", "North").with("sales", 10.0)];
        let ds = Dataset::new(vec!["region".into(), "sales".into()], records).unwrap();
        let json = serde_json::to_value(summarize(&ds)).unwrap();

        assert_eq!(
            json,
            json!({
                "totalRecords": 1,
                "columnCount": 2,
                "numericColumnCount": 1,
                "categoricalColumnCount": 1,
                "columnStats": {
                    "sales": {"mean": 10.0, "min": 10.0, "max": 10.0, "count": 1, "stdDev": 0.0}
                },
                "sampleRecords": [{"region": "North", "sales": 10.0}],
                "columnTypes": [
                    {"name": "region", "type": "categorical", "sampleValues": ["North"]},
                    {"name": "sales", "type": "numeric", "sampleValues": [10.0]}
                ]
            })
        );
    }

    #[test]
    fn test_sample_record_preserves_column_order() {
        let records = vec![Record::new().with("z", 1.0).with("a", 2.0)];
        let ds = Dataset::new(vec!["z".into(), "a".into()], records).unwrap();
        let text = summarize(&ds).to_json_pretty().unwrap();

        let z = text.find("\"z\": 1.0").unwrap();
        let a = text.find("\"a\": 2.0").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_column_stats_follow_column_order() {
        let records = vec![Record::new().with("zeta", 1.0).with("alpha", 2.0).with("mid", 3.0)];
        let ds = Dataset::new(vec!["zeta".into(), "alpha".into(), "mid".into()], records).unwrap();
        let summary = summarize(&ds);

        let names: Vec<&str> = summary.column_stats.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let text = summary.to_json_pretty().unwrap();
        let stats_start = text.find("\"columnStats\"").unwrap();
        let zeta = text[stats_start..].find("\"zeta\"").unwrap();
        let alpha = text[stats_start..].find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_summary_is_stable() {
        let ds = dataset(12);
        assert_eq!(summarize(&ds), summarize(&ds));
        assert_eq!(
            summarize(&ds).to_json_pretty().unwrap(),
            summarize(&ds).to_json_pretty().unwrap()
        );
    }
}
