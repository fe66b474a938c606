//! Shared data model: tagged cell values, records, datasets, column
//! classification and chart specifications.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize, Serializer};

use crate::config::TALLY_SENTINEL;
use crate::error::{InsightError, Result};

// ============================================================================
// Values and records
// ============================================================================

/// A single cell of a dataset.
///
/// Ingestion adapters normalize every raw field into one of these variants, so
/// downstream code matches on an exhaustive set instead of probing runtime
/// types. An empty string is never stored as `Text`; it becomes `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

static MISSING: Value = Value::Missing;

impl Value {
    /// Build a text value, mapping the empty string to [`Value::Missing`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() { Value::Missing } else { Value::Text(s) }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Interpret the value as a finite number.
    ///
    /// Text is trimmed and parsed; anything that does not yield a finite
    /// `f64` (including "NaN" and "inf") is rejected.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) | Value::Missing => None,
            Value::Text(s) => crate::utils::parse_finite(s),
        }
    }

    /// Stringified form used as a grouping key, `None` when missing.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(crate::utils::format_number(*n)),
            Value::Text(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(_) | Value::Missing => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
            serde_json::Value::String(s) => Value::text(s),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            nested => Value::Text(nested.to_string()),
        }
    }
}

/// One row of a dataset: column name to value.
///
/// Absent keys read as [`Value::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Value of a field; absent fields are missing.
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&MISSING)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

// ============================================================================
// Dataset
// ============================================================================

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// An immutable, validated snapshot of rectangular data.
///
/// Construction checks the input shape; every analysis component takes a
/// `&Dataset` and can therefore assume at least one record and a non-empty,
/// duplicate-free column list. Each snapshot carries a process-unique
/// version used as a cache key; clones share it.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
    version: u64,
}

impl Dataset {
    /// Validate and wrap records with their ordered column list.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        if columns.is_empty() {
            return Err(InsightError::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(InsightError::DuplicateColumn(column.clone()));
            }
        }

        if records.is_empty() {
            return Err(InsightError::EmptyDataset);
        }

        for (row, record) in records.iter().enumerate() {
            if let Some(extra) = record.field_names().find(|name| !seen.contains(name)) {
                return Err(InsightError::ColumnMismatch {
                    row,
                    column: extra.to_string(),
                });
            }
        }

        Ok(Self {
            columns,
            records,
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Build a dataset from positional rows aligned with `columns`.
    ///
    /// Short rows are padded with missing values; long rows are a column
    /// mismatch.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut records = Vec::with_capacity(rows.len());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() > columns.len() {
                return Err(InsightError::ColumnMismatch {
                    row,
                    column: format!("#{}", columns.len()),
                });
            }
            records.push(columns.iter().cloned().zip(values).collect::<Record>());
        }
        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

// ============================================================================
// Column classification
// ============================================================================

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
        }
    }
}

/// A dataset column together with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }
}

/// Descriptive statistics of a numeric column over its valid values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Population standard deviation.
    pub std_dev: f64,
}

// ============================================================================
// Chart specification
// ============================================================================

/// Supported chart shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

impl FromStr for ChartType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            other => Err(InsightError::InvalidConfig(format!(
                "unknown chart type '{}'",
                other
            ))),
        }
    }
}

/// User-chosen chart configuration driving aggregation.
///
/// A `y_field` equal to [`TALLY_SENTINEL`] (or absent) counts records instead
/// of aggregating a numeric field. `group_field` only affects bar charts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub x_field: Option<String>,
    pub y_field: Option<String>,
    pub group_field: Option<String>,
}

impl ChartSpec {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Self::default()
        }
    }

    pub fn x(mut self, field: impl Into<String>) -> Self {
        self.x_field = Some(field.into());
        self
    }

    pub fn y(mut self, field: impl Into<String>) -> Self {
        self.y_field = Some(field.into());
        self
    }

    pub fn group(mut self, field: impl Into<String>) -> Self {
        self.group_field = Some(field.into());
        self
    }

    /// The numeric field being aggregated, `None` in tally mode.
    pub fn measure_field(&self) -> Option<&str> {
        self.y_field
            .as_deref()
            .filter(|field| !field.is_empty() && *field != TALLY_SENTINEL)
    }

    pub fn is_tally(&self) -> bool {
        self.measure_field().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ==================== Value tests ====================

    #[test]
    fn test_empty_text_is_missing() {
        assert_eq!(Value::text(""), Value::Missing);
        assert_eq!(Value::from(""), Value::Missing);
        assert_eq!(Value::text(" "), Value::Text(" ".to_string()));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Number(4.5).as_number(), Some(4.5));
        assert_eq!(Value::text(" 12 ").as_number(), Some(12.0));
        assert_eq!(Value::text("1e3").as_number(), Some(1000.0));
        assert_eq!(Value::text("abc").as_number(), None);
        assert_eq!(Value::text("NaN").as_number(), None);
        assert_eq!(Value::Number(f64::INFINITY).as_number(), None);
        assert_eq!(Value::Missing.as_number(), None);
    }

    #[test]
    fn test_as_key() {
        assert_eq!(Value::Number(10.0).as_key().as_deref(), Some("10"));
        assert_eq!(Value::Number(2.5).as_key().as_deref(), Some("2.5"));
        assert_eq!(Value::text("North").as_key().as_deref(), Some("North"));
        assert_eq!(Value::Missing.as_key(), None);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(Value::from(serde_json::json!(null)), Value::Missing);
        assert_eq!(Value::from(serde_json::json!(3)), Value::Number(3.0));
        assert_eq!(Value::from(serde_json::json!("")), Value::Missing);
        assert_eq!(Value::from(serde_json::json!(true)), Value::text("true"));
        assert_eq!(
            Value::from(serde_json::json!({"a": 1})),
            Value::text("{\"a\":1}")
        );
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_string(&vec![
            Value::Number(1.5),
            Value::text("x"),
            Value::Missing,
        ])
        .unwrap();
        assert_eq!(json, "[1.5,\"x\",null]");
    }

    // ==================== Dataset tests ====================

    #[test]
    fn test_dataset_rejects_no_columns() {
        let err = Dataset::new(vec![], vec![Record::new()]).unwrap_err();
        assert!(matches!(err, InsightError::NoColumns));
    }

    #[test]
    fn test_dataset_rejects_empty_records() {
        let err = Dataset::new(cols(&["a"]), vec![]).unwrap_err();
        assert!(matches!(err, InsightError::EmptyDataset));
    }

    #[test]
    fn test_dataset_rejects_duplicate_columns() {
        let err = Dataset::new(cols(&["a", "b", "a"]), vec![Record::new()]).unwrap_err();
        assert!(matches!(err, InsightError::DuplicateColumn(ref c) if c == "a"));
    }

    #[test]
    fn test_dataset_rejects_unknown_field() {
        let records = vec![
            Record::new().with("a", 1.0),
            Record::new().with("a", 2.0).with("z", "extra"),
        ];
        let err = Dataset::new(cols(&["a"]), records).unwrap_err();
        assert!(matches!(
            err,
            InsightError::ColumnMismatch { row: 1, ref column } if column == "z"
        ));
    }

    #[test]
    fn test_dataset_absent_field_reads_missing() {
        let ds = Dataset::new(cols(&["a", "b"]), vec![Record::new().with("a", 1.0)]).unwrap();
        assert!(ds.records()[0].get("b").is_missing());
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let ds = Dataset::from_rows(
            cols(&["a", "b"]),
            vec![vec![Value::Number(1.0)], vec![Value::Number(2.0), Value::text("x")]],
        )
        .unwrap();
        assert!(ds.records()[0].get("b").is_missing());
        assert_eq!(ds.records()[1].get("b"), &Value::text("x"));
    }

    #[test]
    fn test_from_rows_rejects_long_rows() {
        let err = Dataset::from_rows(
            cols(&["a"]),
            vec![vec![Value::Number(1.0), Value::Number(2.0)]],
        )
        .unwrap_err();
        assert!(err.is_input_shape());
    }

    #[test]
    fn test_versions_are_unique_and_shared_by_clones() {
        let a = Dataset::new(cols(&["a"]), vec![Record::new()]).unwrap();
        let b = Dataset::new(cols(&["a"]), vec![Record::new()]).unwrap();
        assert_ne!(a.version(), b.version());
        assert_eq!(a.clone().version(), a.version());
    }

    // ==================== ChartSpec tests ====================

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("Pie".parse::<ChartType>().unwrap(), ChartType::Pie);
        assert_eq!(" scatter ".parse::<ChartType>().unwrap(), ChartType::Scatter);
        assert!("donut".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_tally_detection() {
        assert!(ChartSpec::new(ChartType::Bar).x("region").is_tally());
        assert!(ChartSpec::new(ChartType::Bar).x("region").y("count").is_tally());
        let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales");
        assert!(!spec.is_tally());
        assert_eq!(spec.measure_field(), Some("sales"));
    }

    #[test]
    fn test_column_serialization() {
        let column = Column {
            name: "sales".to_string(),
            column_type: ColumnType::Numeric,
        };
        let json = serde_json::to_string(&column).unwrap();
        assert_eq!(json, r#"{"name":"sales","type":"numeric"}"#);
    }

    #[test]
    fn test_column_stats_serialization_uses_camel_case() {
        let stats = ColumnStats {
            mean: 2.0,
            min: 1.0,
            max: 3.0,
            count: 3,
            std_dev: 0.5,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"stdDev\":0.5"));
    }
}
