//! Chart aggregation engine.
//!
//! Turns raw records plus a [`ChartSpec`] into chart-ready point sequences
//! for four chart shapes:
//!
//! - **bar / line**: one point per x-group, averaging the measure (or
//!   counting records in tally mode), capped to the first x-groups seen
//! - **bar with a group field**: a pivot of x-group by series, summing the
//!   measure (or counting), with the series set limited to the first values
//!   encountered
//! - **pie**: one slice per x-group, summing the measure (or counting),
//!   largest slices first
//! - **scatter**: raw (x, y) pairs of two numeric columns
//!
//! Aggregation never fails. An ill-formed spec produces
//! [`ChartData::Empty`] with the reason, so callers can render a placeholder
//! and tests can assert on why nothing was produced.
//!
//! # Example
//!
//! ```rust,ignore
//! use datainsight_core::charts::ChartAggregator;
//! use datainsight_core::{ChartSpec, ChartType};
//!
//! let spec = ChartSpec::new(ChartType::Bar).x("region").y("sales");
//! let data = ChartAggregator::new(&config).aggregate(&dataset, &profile.columns, &spec);
//! for point in data.points() {
//!     println!("{:?}", point);
//! }
//! ```

mod cache;
mod category;
mod pie;
mod scatter;

pub use cache::ChartCache;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue, json};
use tracing::debug;

use crate::config::{AnalysisConfig, TALLY_SENTINEL};
use crate::types::{ChartSpec, ChartType, Column, Dataset, Value};

/// Aggregated value of an ungrouped bar or line point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Mean of the measure field over the group's valid values.
    Average(f64),
    /// Number of records in the group.
    Count(usize),
}

/// One renderable point; the variant depends on the chart type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPoint {
    /// Ungrouped bar or line point.
    Category { x: String, measure: Measure },
    /// Grouped bar point: one cell per series present in this x-group.
    Grouped { x: String, cells: Vec<(String, f64)> },
    /// Pie slice.
    Slice { name: String, value: f64 },
    /// Scatter point.
    Scatter { x: f64, y: f64 },
}

/// Why a chart has nothing to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No x field was chosen.
    MissingXField,
    /// The chart type needs a y field and none (or the tally sentinel) was given.
    MissingYField,
    /// A field in the chart spec is not a dataset column.
    UnknownField(String),
    /// A scatter axis is not a numeric column.
    NonNumericAxis(String),
    /// No record produced a point.
    NoQualifyingRecords,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::MissingXField => write!(f, "no x field selected"),
            EmptyReason::MissingYField => write!(f, "no y field selected"),
            EmptyReason::UnknownField(field) => write!(f, "unknown field '{}'", field),
            EmptyReason::NonNumericAxis(field) => write!(f, "field '{}' is not numeric", field),
            EmptyReason::NoQualifyingRecords => write!(f, "no qualifying records"),
        }
    }
}

/// A successfully aggregated chart with the labels a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub spec: ChartSpec,
    /// Series names of a grouped bar chart, in first-encounter order.
    pub series: Vec<String>,
    pub points: Vec<ChartPoint>,
}

/// Success-or-empty result of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ChartData {
    Ready(ChartView),
    Empty(EmptyReason),
}

impl ChartData {
    pub(crate) fn from_points(spec: &ChartSpec, series: Vec<String>, points: Vec<ChartPoint>) -> Self {
        if points.is_empty() {
            return ChartData::Empty(EmptyReason::NoQualifyingRecords);
        }
        ChartData::Ready(ChartView {
            spec: spec.clone(),
            series,
            points,
        })
    }

    /// Points to render; empty when there is nothing to display.
    pub fn points(&self) -> &[ChartPoint] {
        match self {
            ChartData::Ready(view) => &view.points,
            ChartData::Empty(_) => &[],
        }
    }

    pub fn series(&self) -> &[String] {
        match self {
            ChartData::Ready(view) => &view.series,
            ChartData::Empty(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartData::Empty(_))
    }

    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            ChartData::Empty(reason) => Some(reason),
            ChartData::Ready(_) => None,
        }
    }

    /// Render points as flat JSON rows keyed by the chart's field names,
    /// the layout charting libraries consume directly.
    ///
    /// The x entry is written first. A later key that would overwrite an
    /// existing one (a series named like the x field, or a scatter plotting a
    /// field against itself) gets a `_2`, `_3`, ... suffix.
    pub fn to_rows(&self) -> Vec<JsonValue> {
        let ChartData::Ready(view) = self else {
            return Vec::new();
        };
        let x_field = view.spec.x_field.as_deref().unwrap_or("x");
        let y_field = view.spec.measure_field().unwrap_or(TALLY_SENTINEL);

        view.points
            .iter()
            .map(|point| {
                let mut row = Map::new();
                match point {
                    ChartPoint::Category { x, measure } => {
                        row.insert(x_field.to_string(), json!(x));
                        match measure {
                            Measure::Average(v) => insert_unique(&mut row, y_field, json!(v)),
                            Measure::Count(n) => insert_unique(&mut row, TALLY_SENTINEL, json!(n)),
                        }
                    }
                    ChartPoint::Grouped { x, cells } => {
                        row.insert(x_field.to_string(), json!(x));
                        for (series, v) in cells {
                            insert_unique(&mut row, series, json!(v));
                        }
                    }
                    ChartPoint::Slice { name, value } => {
                        row.insert("name".to_string(), json!(name));
                        row.insert("value".to_string(), json!(value));
                    }
                    ChartPoint::Scatter { x, y } => {
                        row.insert(x_field.to_string(), json!(x));
                        insert_unique(&mut row, y_field, json!(y));
                    }
                }
                JsonValue::Object(row)
            })
            .collect()
    }
}

fn insert_unique(row: &mut Map<String, JsonValue>, key: &str, value: JsonValue) {
    let mut candidate = key.to_string();
    let mut n = 2;
    while row.contains_key(&candidate) {
        candidate = format!("{}_{}", key, n);
        n += 1;
    }
    row.insert(candidate, value);
}

/// Stringified grouping key of a value; missing values get the unknown label.
pub(crate) fn group_key(value: &Value, config: &AnalysisConfig) -> String {
    value
        .as_key()
        .unwrap_or_else(|| config.unknown_label.clone())
}

/// Aggregates datasets into chart points according to an [`AnalysisConfig`].
pub struct ChartAggregator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ChartAggregator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Aggregate `dataset` for `spec`, using `columns` (the dataset's type
    /// classification) to validate numeric axes.
    pub fn aggregate(&self, dataset: &Dataset, columns: &[Column], spec: &ChartSpec) -> ChartData {
        match self.validate(dataset, columns, spec) {
            Ok(x_field) => self.dispatch(dataset, spec, x_field),
            Err(reason) => {
                debug!("Chart {} has nothing to display: {:?}", spec.chart_type, reason);
                ChartData::Empty(reason)
            }
        }
    }

    fn dispatch(&self, dataset: &Dataset, spec: &ChartSpec, x_field: &str) -> ChartData {
        let measure = spec.measure_field();
        match spec.chart_type {
            ChartType::Pie => pie::aggregate_pie(dataset, spec, x_field, measure, self.config),
            ChartType::Scatter => match measure {
                Some(y_field) => {
                    scatter::aggregate_scatter(dataset, spec, x_field, y_field, self.config)
                }
                None => ChartData::Empty(EmptyReason::MissingYField),
            },
            ChartType::Bar => match active_group_field(spec) {
                Some(group_field) => category::aggregate_grouped(
                    dataset,
                    spec,
                    x_field,
                    group_field,
                    measure,
                    self.config,
                ),
                None => category::aggregate_category(dataset, spec, x_field, measure, self.config),
            },
            ChartType::Line => {
                if active_group_field(spec).is_some() {
                    debug!("Group field ignored for line charts");
                }
                category::aggregate_category(dataset, spec, x_field, measure, self.config)
            }
        }
    }

    fn validate<'s>(
        &self,
        dataset: &Dataset,
        columns: &[Column],
        spec: &'s ChartSpec,
    ) -> Result<&'s str, EmptyReason> {
        let x_field = spec
            .x_field
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(EmptyReason::MissingXField)?;

        let mut fields = vec![x_field];
        fields.extend(spec.measure_field());
        if spec.chart_type == ChartType::Bar {
            fields.extend(active_group_field(spec));
        }
        if let Some(unknown) = fields.iter().find(|f| !dataset.has_column(f)) {
            return Err(EmptyReason::UnknownField(unknown.to_string()));
        }

        if spec.chart_type == ChartType::Scatter {
            let y_field = spec.measure_field().ok_or(EmptyReason::MissingYField)?;
            for axis in [x_field, y_field] {
                let numeric = columns.iter().any(|c| c.name == axis && c.is_numeric());
                if !numeric {
                    return Err(EmptyReason::NonNumericAxis(axis.to_string()));
                }
            }
        }

        Ok(x_field)
    }
}

fn active_group_field(spec: &ChartSpec) -> Option<&str> {
    spec.group_field.as_deref().filter(|f| !f.is_empty())
}
